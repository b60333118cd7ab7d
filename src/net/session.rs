use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, Notify};
use tracing::debug;
use uuid::Uuid;

use crate::game::color::PlayerColor;
use crate::game::player::Player;

pub type SessionId = Uuid;

/// Shared handle to the outbound half of a participant's stream. Every write
/// goes through the handle's own mutex, so a stalled peer only ever delays
/// its own frames.
pub type FrameWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

/// One connected participant. The session outlives any number of player
/// respawns; it dies only on disconnect or idle eviction.
pub struct Session {
    pub id: SessionId,
    pub writer: FrameWriter,
    /// Best score this connection has reached, across respawns
    pub high_score: u32,
    pub last_action: Instant,
    /// Signalled on removal so the session's input task stops reading even
    /// when the peer never sends another byte
    pub closed: Arc<Notify>,
    pub player: Player,
}

impl Session {
    pub fn new(writer: FrameWriter, width: usize, height: usize, color: PlayerColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            writer,
            high_score: 0,
            last_action: Instant::now(),
            closed: Arc::new(Notify::new()),
            player: Player::new(width, height, color),
        }
    }

    /// Stamp the last-input time
    pub fn touch(&mut self) {
        self.last_action = Instant::now();
    }

    /// Whether the participant has gone quiet for longer than `timeout`
    pub fn is_idle_beyond(&self, timeout: Duration) -> bool {
        self.last_action.elapsed() > timeout
    }

    /// Respawn: replace the player in place, keeping the color. Trail,
    /// position, and score reset; the session's own high score survives.
    pub fn start_over(&mut self, width: usize, height: usize) {
        self.player = Player::new(width, height, self.player.color);
    }
}

/// Queue `text` onto a session's stream without blocking the caller. Write
/// failures mean the peer is gone; the disconnect path cleans up.
pub fn send_text(writer: &FrameWriter, text: String) {
    let writer = writer.clone();
    tokio::spawn(async move {
        let mut writer = writer.lock().await;
        if let Err(e) = writer.write_all(text.as_bytes()).await {
            debug!("dropping frame for stalled peer: {}", e);
        }
    });
}

/// Queue `text` and then shut the stream down (farewell path)
pub fn send_text_and_close(writer: &FrameWriter, text: String) {
    let writer = writer.clone();
    tokio::spawn(async move {
        let mut writer = writer.lock().await;
        if let Err(e) = writer.write_all(text.as_bytes()).await {
            debug!("farewell write failed: {}", e);
        }
        if let Err(e) = writer.shutdown().await {
            debug!("stream shutdown failed: {}", e);
        }
    });
}
