use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tracing::debug;

use crate::game::color::{PlayerColor, PALETTE};
use crate::game::constants::sim;
use crate::game::geometry::Direction;
use crate::game::grid::Grid;
use crate::game::render;
use crate::net::registry::SessionRegistry;
use crate::net::session::{Session, SessionId};

/// Things a tick decides that need async follow-up outside the arena lock
pub enum TickEvent {
    /// The session went quiet past the idle timeout and has already been
    /// unregistered; the caller notifies the peer and closes the stream.
    SessionTimedOut { session: Session },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ArenaError {
    #[error("color {0:?} is already held by a live player")]
    ColorInUse(PlayerColor),
}

/// One independent world: a grid, the live session set, and a global high
/// score. An arena runs from creation until the manager reaps it at the
/// disconnect that empties it; there is no pause state.
pub struct Arena {
    name: String,
    grid: Grid,
    high_score: u32,
    idle_timeout: Duration,
    registry: SessionRegistry,
}

impl Arena {
    pub fn new(name: String, width: usize, height: usize) -> Self {
        Self {
            name,
            grid: Grid::new(width, height),
            high_score: 0,
            idle_timeout: sim::IDLE_TIMEOUT,
            registry: SessionRegistry::new(),
        }
    }

    /// Override the idle timeout (tests)
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.registry.iter()
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.registry.get(id)
    }

    pub fn contains_session(&self, id: SessionId) -> bool {
        self.registry.contains(id)
    }

    /// Palette colors not currently held by a live player, in palette order.
    /// Empty means the arena is full.
    pub fn available_colors(&self) -> Vec<PlayerColor> {
        let used: HashSet<PlayerColor> = self.registry.iter().map(|s| s.player.color).collect();
        PALETTE
            .iter()
            .copied()
            .filter(|c| !used.contains(c))
            .collect()
    }

    /// Register a session. The hide-cursor admission side effect is written
    /// by the caller, which still holds the stream.
    pub fn admit(&mut self, session: Session) -> Result<(), ArenaError> {
        let color = session.player.color;
        if self.registry.iter().any(|s| s.player.color == color) {
            return Err(ArenaError::ColorInUse(color));
        }
        self.registry.register(session);
        Ok(())
    }

    /// Remove a session. Idempotent: a second call for the same id returns
    /// `None` and changes nothing. Farewell output and stream shutdown are
    /// the caller's async follow-up.
    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        self.registry.unregister(id)
    }

    /// Forward a decoded directional command to the session's player,
    /// stamping the idle clock only when the turn is accepted.
    pub fn steer(&mut self, id: SessionId, direction: Direction) {
        if let Some(session) = self.registry.get_mut(id) {
            if session.player.set_direction(direction) {
                session.touch();
            }
        }
    }

    /// Render one participant's full-screen frame
    pub fn render(&self, id: SessionId) -> Option<String> {
        self.registry.get(id).map(|s| render::frame(self, s))
    }

    /// One simulation step. `delta_ms` is the wall time since the previous
    /// tick; every player sees the same delta and the same membership.
    pub fn tick(&mut self, delta_ms: f64) -> Vec<TickEvent> {
        let mut events = Vec::new();
        let player_count = self.registry.len();
        let (width, height) = (self.grid.width(), self.grid.height());

        // Movement, scoring, bounds, and idle checks
        let mut timed_out = Vec::new();
        for session in self.registry.iter_mut() {
            session.player.update(delta_ms, player_count);

            let score = session.player.score();
            if score > session.high_score {
                session.high_score = score;
            }
            if score > self.high_score {
                self.high_score = score;
            }

            let (x, y) = session.player.pos.cell();
            if !self.grid.contains(x, y) {
                debug!(session = %session.id, "player left the grid, respawning");
                session.start_over(width, height);
            }

            if session.is_idle_beyond(self.idle_timeout) {
                timed_out.push(session.id);
            }
        }

        for id in timed_out {
            if let Some(session) = self.registry.unregister(id) {
                debug!(session = %id, arena = %self.name, "evicting idle session");
                events.push(TickEvent::SessionTimedOut { session });
            }
        }

        // Collision resolution runs against a snapshot taken after everyone
        // has moved, so the outcome cannot depend on iteration order and two
        // players meeting head-on in the same cell both reset.
        let mut trail_cells: HashSet<(i32, i32)> = HashSet::new();
        let mut head_counts: HashMap<(i32, i32), usize> = HashMap::new();
        for session in self.registry.iter() {
            for seg in &session.player.trail {
                trail_cells.insert(seg.pos.cell());
            }
            *head_counts.entry(session.player.pos.cell()).or_insert(0) += 1;
        }

        let collided: Vec<SessionId> = self
            .registry
            .iter()
            .filter(|s| {
                let cell = s.player.pos.cell();
                trail_cells.contains(&cell) || head_counts.get(&cell).copied().unwrap_or(0) > 1
            })
            .map(|s| s.id)
            .collect();

        for id in collided {
            if let Some(session) = self.registry.get_mut(id) {
                debug!(session = %id, "trail collision, respawning");
                session.start_over(width, height);
            }
        }

        events
    }
}
