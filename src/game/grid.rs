/// Cell contents. `Blocking` exists for obstacle support; worlds are
/// initialized all-open and nothing toggles tiles during live play.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TileKind {
    #[default]
    Open,
    Blocking,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum GridError {
    #[error("cell ({0}, {1}) is out of bounds")]
    OutOfBounds(i32, i32),
}

/// Rectangular playing field. Read-only after initialization; top-left is
/// (0, 0).
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether a rounded cell lies on the field
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn tile(&self, x: usize, y: usize) -> Option<Tile> {
        if x < self.width && y < self.height {
            Some(self.tiles[y * self.width + x])
        } else {
            None
        }
    }

    /// Set a tile. Out-of-bounds writes are an internal invariant violation
    /// and never occur during live play.
    pub fn set_tile(&mut self, x: i32, y: i32, kind: TileKind) -> Result<(), GridError> {
        if !self.contains(x, y) {
            return Err(GridError::OutOfBounds(x, y));
        }
        self.tiles[y as usize * self.width + x as usize].kind = kind;
        Ok(())
    }
}
