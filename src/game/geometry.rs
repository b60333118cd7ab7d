use crate::game::constants::glyph;

/// Continuous position on the grid. Players move in sub-cell increments;
/// collision and rendering use the half-up rounded cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn from_cell(x: i32, y: i32) -> Self {
        Self {
            x: x as f64,
            y: y as f64,
        }
    }

    /// Rounded cell column (half-up: floor(x + 0.5))
    #[inline]
    pub fn round_x(&self) -> i32 {
        (self.x + 0.5).floor() as i32
    }

    /// Rounded cell row (half-up: floor(y + 0.5))
    #[inline]
    pub fn round_y(&self) -> i32 {
        (self.y + 0.5).floor() as i32
    }

    /// Rounded cell as a pair
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.round_x(), self.round_y())
    }
}

/// Heading of a player. A change to the exact opposite heading is rejected
/// at the player level so a cycle can never reverse into its own head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    /// The reverse heading
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Right => Direction::Left,
        }
    }

    /// Marker glyph drawn at a player's head while travelling this way
    pub fn glyph(self) -> char {
        match self {
            Direction::Up => glyph::PLAYER_UP,
            Direction::Left => glyph::PLAYER_LEFT,
            Direction::Down => glyph::PLAYER_DOWN,
            Direction::Right => glyph::PLAYER_RIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(Position::new(1.0, 1.0).cell(), (1, 1));
        assert_eq!(Position::new(1.49, 2.5).cell(), (1, 3));
        assert_eq!(Position::new(1.5, 2.99).cell(), (2, 3));
    }

    #[test]
    fn test_round_negative() {
        // floor(v + 0.5), not truncation: -0.6 rounds to -1
        assert_eq!(Position::new(-0.6, -0.5).cell(), (-1, 0));
        assert_eq!(Position::new(-0.4, -1.2).cell(), (0, -1));
    }

    #[test]
    fn test_opposite() {
        for dir in Direction::ALL {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn test_direction_glyphs_distinct() {
        let glyphs: Vec<char> = Direction::ALL.iter().map(|d| d.glyph()).collect();
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
