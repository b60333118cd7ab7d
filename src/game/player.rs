use std::collections::VecDeque;
use std::time::Instant;

use rand::Rng;

use crate::game::color::PlayerColor;
use crate::game::constants::{glyph, score, speed};
use crate::game::geometry::{Direction, Position};

/// One glyph of a player's trail, pinned to the cell the player left
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub glyph: char,
    pub pos: Position,
}

/// The simulated light cycle controlled by one session. Created at admission
/// and replaced wholesale on every respawn; the color survives the lineage.
#[derive(Debug, Clone)]
pub struct Player {
    pub direction: Direction,
    pub marker: char,
    pub color: PlayerColor,
    pub pos: Position,
    /// Newest segment first; append-only until respawn
    pub trail: VecDeque<TrailSegment>,
    pub created_at: Instant,
    score: f64,
}

impl Player {
    /// Spawn at a random continuous position on a `width` x `height` field.
    /// The range keeps the rounded cell in bounds on both axes.
    pub fn new(width: usize, height: usize, color: PlayerColor) -> Self {
        let mut rng = rand::thread_rng();
        let pos = Position::new(
            rng.gen_range(0.0..width as f64 - 0.5),
            rng.gen_range(0.0..height as f64 - 0.5),
        );
        Self::at(pos, color)
    }

    /// Spawn at an exact position (tests and benches)
    pub fn at(pos: Position, color: PlayerColor) -> Self {
        Self {
            direction: Direction::Down,
            marker: Direction::Down.glyph(),
            color,
            pos,
            trail: VecDeque::new(),
            created_at: Instant::now(),
            score: 0.0,
        }
    }

    /// Truncated score for display and high-score comparison
    pub fn score(&self) -> u32 {
        self.score as u32
    }

    /// Change heading. Reversing into the current heading is rejected so a
    /// cycle cannot instantly run over its own trail; returns whether the
    /// change was accepted so the session can stamp its last-input time.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if direction == self.direction.opposite() {
            return false;
        }
        self.direction = direction;
        self.marker = direction.glyph();
        true
    }

    /// Advance `delta_ms` along the current heading, grow the trail if the
    /// rounded cell changed, and accrue score. `player_count` is the number
    /// of live players sharing the arena; scoring needs company.
    pub fn update(&mut self, delta_ms: f64, player_count: usize) {
        let (start_x, start_y) = self.pos.cell();

        match self.direction {
            Direction::Up => self.pos.y -= speed::VERTICAL * delta_ms,
            Direction::Left => self.pos.x -= speed::HORIZONTAL * delta_ms,
            Direction::Down => self.pos.y += speed::VERTICAL * delta_ms,
            Direction::Right => self.pos.x += speed::HORIZONTAL * delta_ms,
        }

        let (end_x, end_y) = self.pos.cell();

        if end_x != start_x || end_y != start_y {
            let marker = self.trail_glyph(end_x, end_y);
            self.trail.push_front(TrailSegment {
                glyph: marker,
                pos: Position::from_cell(start_x, start_y),
            });
        }

        let opponents = player_count.saturating_sub(1) as f64;
        self.score += delta_ms / 1000.0 * opponents * score::PLAYER_COUNT_MULTIPLIER;
    }

    /// Pick the glyph for the segment left behind at the previous cell.
    ///
    /// Corners are a lookup over (current direction, sign of the cell delta
    /// from the previous trail head to the new head). The eight corner arms
    /// below are fixed pairs; changing any comparison breaks the rendered
    /// bends. A run's first segment is always straight.
    fn trail_glyph(&self, end_x: i32, end_y: i32) -> char {
        if let Some(last) = self.trail.front() {
            let (last_x, last_y) = last.pos.cell();
            let east = end_x > last_x;
            let west = end_x < last_x;
            let south = end_y > last_y;
            let north = end_y < last_y;

            match self.direction {
                Direction::Right if east && north => return glyph::TRAIL_LEFT_CORNER_UP,
                Direction::Down if west && south => return glyph::TRAIL_LEFT_CORNER_UP,
                Direction::Up if east && north => return glyph::TRAIL_RIGHT_CORNER_DOWN,
                Direction::Left if west && south => return glyph::TRAIL_RIGHT_CORNER_DOWN,
                Direction::Down if east && south => return glyph::TRAIL_RIGHT_CORNER_UP,
                Direction::Left if west && north => return glyph::TRAIL_RIGHT_CORNER_UP,
                Direction::Right if east && south => return glyph::TRAIL_LEFT_CORNER_DOWN,
                Direction::Up if west && north => return glyph::TRAIL_LEFT_CORNER_DOWN,
                _ => {}
            }
        }

        match self.direction {
            Direction::Up | Direction::Down => glyph::TRAIL_VERTICAL,
            Direction::Left | Direction::Right => glyph::TRAIL_HORIZONTAL,
        }
    }
}
