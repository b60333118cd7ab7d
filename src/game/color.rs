use crate::game::constants::term;

/// Player colors. Each color is a scarce resource: at most one live player
/// per color per arena, so the palette size caps arena occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerColor {
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
}

/// Assignment order for new sessions
pub const PALETTE: [PlayerColor; 6] = [
    PlayerColor::Red,
    PlayerColor::Green,
    PlayerColor::Yellow,
    PlayerColor::Blue,
    PlayerColor::Magenta,
    PlayerColor::Cyan,
];

impl PlayerColor {
    /// Display name, used in the HUD and for the opponent score ordering
    pub fn name(self) -> &'static str {
        match self {
            PlayerColor::Red => "Red",
            PlayerColor::Green => "Green",
            PlayerColor::Yellow => "Yellow",
            PlayerColor::Blue => "Blue",
            PlayerColor::Magenta => "Magenta",
            PlayerColor::Cyan => "Cyan",
        }
    }

    /// ANSI foreground code for the player's glyphs and trail
    pub fn fg(self) -> &'static str {
        match self {
            PlayerColor::Red => "\x1b[31m",
            PlayerColor::Green => "\x1b[32m",
            PlayerColor::Yellow => "\x1b[33m",
            PlayerColor::Blue => "\x1b[34m",
            PlayerColor::Magenta => "\x1b[35m",
            PlayerColor::Cyan => "\x1b[36m",
        }
    }

    /// Bright variant, used to tint the border of the owning player's view
    pub fn fg_bright(self) -> &'static str {
        match self {
            PlayerColor::Red => "\x1b[91m",
            PlayerColor::Green => "\x1b[92m",
            PlayerColor::Yellow => "\x1b[93m",
            PlayerColor::Blue => "\x1b[94m",
            PlayerColor::Magenta => "\x1b[95m",
            PlayerColor::Cyan => "\x1b[96m",
        }
    }

    /// Wrap a single glyph in this color
    pub fn paint(self, ch: char) -> String {
        format!("{}{}{}", self.fg(), ch, term::RESET)
    }

    /// Wrap a single glyph in the bright border variant
    pub fn paint_bright(self, ch: char) -> String {
        format!("{}{}{}", self.fg_bright(), ch, term::RESET)
    }
}
