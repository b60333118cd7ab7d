/// Movement speeds in grid cells per millisecond. Vertical travel is slower
/// to compensate for terminal cells being roughly twice as tall as wide.
pub mod speed {
    pub const HORIZONTAL: f64 = 0.01;
    pub const VERTICAL: f64 = 0.007;
}

/// Scoring constants
pub mod score {
    /// Per-opponent score multiplier - crowded arenas pay better
    pub const PLAYER_COUNT_MULTIPLIER: f64 = 1.25;
}

/// Simulation scheduling
pub mod sim {
    use std::time::Duration;

    /// Simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Full-frame redraw rate in Hz
    pub const REDRAW_RATE: u32 = 15;
    /// Tick interval
    pub const TICK_INTERVAL: Duration = Duration::from_micros(1_000_000 / TICK_RATE as u64);
    /// Redraw interval
    pub const REDRAW_INTERVAL: Duration = Duration::from_micros(1_000_000 / REDRAW_RATE as u64);
    /// Sessions idle longer than this are evicted from their arena
    pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15);
}

/// Default world dimensions in cells
pub mod world {
    pub const WIDTH: usize = 78;
    pub const HEIGHT: usize = 22;
}

/// Glyphs used for players, trails, and the world border
pub mod glyph {
    pub const PLAYER_UP: char = '⇡';
    pub const PLAYER_LEFT: char = '⇠';
    pub const PLAYER_DOWN: char = '⇣';
    pub const PLAYER_RIGHT: char = '⇢';

    pub const TRAIL_HORIZONTAL: char = '┄';
    pub const TRAIL_VERTICAL: char = '┆';
    pub const TRAIL_LEFT_CORNER_UP: char = '╭';
    pub const TRAIL_LEFT_CORNER_DOWN: char = '╰';
    pub const TRAIL_RIGHT_CORNER_DOWN: char = '╯';
    pub const TRAIL_RIGHT_CORNER_UP: char = '╮';

    pub const WALL_VERTICAL: char = '║';
    pub const WALL_HORIZONTAL: char = '═';
    pub const WALL_TOP_LEFT: char = '╔';
    pub const WALL_TOP_RIGHT: char = '╗';
    pub const WALL_BOTTOM_RIGHT: char = '╝';
    pub const WALL_BOTTOM_LEFT: char = '╚';

    pub const TILE_OPEN: char = ' ';
    pub const TILE_BLOCKING: char = '■';
}

/// Terminal control sequences and canned messages sent over the wire
pub mod term {
    pub const CLEAR_AND_HOME: &str = "\x1b[H\x1b[2J";
    pub const HIDE_CURSOR: &str = "\x1b[?25l";
    pub const SHOW_CURSOR: &str = "\x1b[?25h";
    pub const RESET: &str = "\x1b[0m";

    pub const FAREWELL: &str = "\r\n\r\n~ End of Line ~ \r\n\r\n";
    pub const IDLE_NOTICE: &str = "\r\n\r\nYou were terminated due to inactivity\r\n";
    pub const SCORE_WARNING: &str =
        " Warning: Other Players Must be in This Game for You to Score! ";
}
