//! Arena manager: matchmaking, per-arena simulation/redraw tasks, and the
//! per-session input loop.
//!
//! Lock order is always manager -> arena. Admission and empty-arena reaping
//! both take the manager write lock first, so a new participant can never be
//! admitted into an arena that is being reclaimed in the same instant.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::game::arena::{Arena, TickEvent};
use crate::game::constants::{sim, term};
use crate::game::render;
use crate::metrics::Metrics;
use crate::net::input::{self, Command};
use crate::net::session::{send_text, send_text_and_close, FrameWriter, Session, SessionId};

pub type SharedManager = Arc<RwLock<ArenaManager>>;

/// Pool of generated arena names
const ARENA_NAMES: &[&str] = &[
    "badger", "bison", "caracal", "cheetah", "condor", "coyote", "dingo",
    "falcon", "ferret", "gecko", "gibbon", "heron", "ibex", "jackal",
    "kestrel", "lemming", "lynx", "macaw", "marmot", "mongoose", "ocelot",
    "osprey", "otter", "pangolin", "puffin", "quokka", "raccoon", "serval",
    "stoat", "tapir", "toucan", "viper", "walrus", "wombat", "yak", "zebra",
];

struct ArenaHandle {
    arena: Arc<RwLock<Arena>>,
    /// Tick and redraw tasks, aborted when the arena is reaped
    tasks: Vec<JoinHandle<()>>,
}

/// Creates arenas on demand, assigns each new connection to one with a free
/// color slot, and reclaims arenas at the disconnect that empties them.
pub struct ArenaManager {
    arenas: HashMap<String, ArenaHandle>,
    config: ServerConfig,
    metrics: Arc<Metrics>,
}

impl ArenaManager {
    pub fn new(config: ServerConfig, metrics: Arc<Metrics>) -> Self {
        Self {
            arenas: HashMap::new(),
            config,
            metrics,
        }
    }

    pub fn into_shared(self) -> SharedManager {
        Arc::new(RwLock::new(self))
    }

    /// Number of live arenas
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    /// Number of live sessions across all arenas
    pub async fn session_count(&self) -> usize {
        let mut sum = 0;
        for handle in self.arenas.values() {
            sum += handle.arena.read().await.session_count();
        }
        sum
    }

    fn next_arena_name(&self) -> String {
        let mut rng = rand::thread_rng();
        for _ in 0..16 {
            let name = ARENA_NAMES[rng.gen_range(0..ARENA_NAMES.len())];
            if !self.arenas.contains_key(name) {
                return name.to_string();
            }
        }
        // Name pool exhausted by collisions; suffix a counter
        let base = ARENA_NAMES[rng.gen_range(0..ARENA_NAMES.len())];
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.arenas.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Matchmaking entry point, called once per established participant stream.
/// Fire and forget: assigns an arena, admits a session, and drives the input
/// loop until disconnect.
pub fn handle_connection<S>(manager: SharedManager, stream: S)
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(stream);
        let writer: FrameWriter =
            Arc::new(Mutex::new(Box::new(writer) as Box<dyn AsyncWrite + Send + Unpin>));

        let (arena, arena_name, session_id) = place(&manager, writer.clone()).await;

        // Admission side effect: take the cursor away for the duration
        send_text(&writer, term::HIDE_CURSOR.to_string());

        let closed = arena
            .read()
            .await
            .session(session_id)
            .map(|s| s.closed.clone())
            .unwrap_or_default();

        run_input_loop(&arena, &arena_name, session_id, closed, reader).await;
        disconnect(&manager, &arena_name, session_id).await;
    });
}

/// Find an arena with a free color, or create one, and admit a new session
/// into it. Holds the manager write lock throughout so concurrent
/// connections serialize.
pub async fn place(
    manager: &SharedManager,
    writer: FrameWriter,
) -> (Arc<RwLock<Arena>>, String, SessionId) {
    let mut mgr = manager.write().await;

    for (name, handle) in &mgr.arenas {
        let mut arena = handle.arena.write().await;
        if let Some(color) = arena.available_colors().first().copied() {
            let session = Session::new(
                writer.clone(),
                arena.grid().width(),
                arena.grid().height(),
                color,
            );
            let session_id = session.id;
            if arena.admit(session).is_ok() {
                info!(arena = %name, session = %session_id, ?color, "admitted session");
                mgr.metrics.session_opened();
                return (handle.arena.clone(), name.clone(), session_id);
            }
        }
    }

    // Every arena is full; open a new one
    let name = mgr.next_arena_name();
    let arena = Arena::new(name.clone(), mgr.config.grid_width, mgr.config.grid_height)
        .with_idle_timeout(mgr.config.idle_timeout);
    let shared = Arc::new(RwLock::new(arena));
    let tasks = spawn_arena_tasks(
        manager.clone(),
        name.clone(),
        shared.clone(),
        mgr.metrics.clone(),
    );
    mgr.arenas
        .insert(name.clone(), ArenaHandle { arena: shared.clone(), tasks });
    mgr.metrics.arena_opened();
    info!(arena = %name, "created arena");

    let session_id = {
        let mut arena = shared.write().await;
        let color = arena.available_colors()[0];
        let session = Session::new(
            writer,
            arena.grid().width(),
            arena.grid().height(),
            color,
        );
        let session_id = session.id;
        // A freshly created arena always has room
        let _ = arena.admit(session);
        info!(arena = %name, session = %session_id, ?color, "admitted session");
        session_id
    };
    mgr.metrics.session_opened();

    (shared, name, session_id)
}

/// Remove a session from its arena, say goodbye, and reap the arena if this
/// was its last session. Safe to call twice; the second call is a no-op.
pub async fn disconnect(manager: &SharedManager, arena_name: &str, session_id: SessionId) {
    let mut mgr = manager.write().await;
    let Some(handle) = mgr.arenas.get(arena_name) else {
        return;
    };

    let removed = handle.arena.write().await.remove(session_id);
    let empty = handle.arena.read().await.is_empty();

    if let Some(session) = removed {
        info!(arena = %arena_name, session = %session_id, "session disconnected");
        session.closed.notify_one();
        send_text_and_close(
            &session.writer,
            format!("{}{}", term::FAREWELL, term::SHOW_CURSOR),
        );
        mgr.metrics.session_closed();
    }

    if empty {
        reap_locked(&mut mgr, arena_name);
    }
}

/// Reap the named arena if it is empty. Serialized against admissions by the
/// manager lock, so it can never tear down an arena a new session just won.
async fn reap_if_empty(manager: &SharedManager, arena_name: &str) {
    let mut mgr = manager.write().await;
    let empty = match mgr.arenas.get(arena_name) {
        Some(handle) => handle.arena.read().await.is_empty(),
        None => return,
    };
    if empty {
        reap_locked(&mut mgr, arena_name);
    }
}

fn reap_locked(mgr: &mut ArenaManager, arena_name: &str) {
    if let Some(handle) = mgr.arenas.remove(arena_name) {
        for task in handle.tasks {
            task.abort();
        }
        mgr.metrics.arena_closed();
        info!(arena = %arena_name, "reaped empty arena");
    }
}

/// Consume decoded key commands until the stream dies, the participant
/// quits, or the session is removed out from under us (idle eviction).
async fn run_input_loop<R>(
    arena: &Arc<RwLock<Arena>>,
    arena_name: &str,
    session_id: SessionId,
    closed: Arc<Notify>,
    mut reader: R,
) where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; 1];
    loop {
        tokio::select! {
            read = reader.read(&mut buf) => match read {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            },
            // Removal cancels a read parked on a silent peer
            _ = closed.notified() => break,
        }

        match input::decode(buf[0]) {
            Some(Command::Move(direction)) => {
                let mut guard = arena.write().await;
                if !guard.contains_session(session_id) {
                    break;
                }
                guard.steer(session_id, direction);
            }
            Some(Command::Quit) => break,
            None => {}
        }
    }
    debug!(arena = %arena_name, session = %session_id, "input loop ended");
}

/// Start the arena's two long-lived schedules: the fixed-rate simulation
/// tick and the slower full-frame redraw broadcast.
fn spawn_arena_tasks(
    manager: SharedManager,
    name: String,
    arena: Arc<RwLock<Arena>>,
    metrics: Arc<Metrics>,
) -> Vec<JoinHandle<()>> {
    let tick_task = {
        let manager = manager.clone();
        let name = name.clone();
        let arena = arena.clone();
        tokio::spawn(async move {
            let mut ticker = interval(sim::TICK_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = Instant::now();

            loop {
                ticker.tick().await;
                let now = Instant::now();
                let delta_ms = now.duration_since(last).as_secs_f64() * 1000.0;
                last = now;

                let started = Instant::now();
                let events = arena.write().await.tick(delta_ms);
                metrics.record_tick(started.elapsed());

                let mut lost_sessions = false;
                for event in events {
                    match event {
                        TickEvent::SessionTimedOut { session } => {
                            info!(arena = %name, session = %session.id, "idle session evicted");
                            session.closed.notify_one();
                            send_text_and_close(
                                &session.writer,
                                format!(
                                    "{}{}{}",
                                    term::IDLE_NOTICE,
                                    term::FAREWELL,
                                    term::SHOW_CURSOR
                                ),
                            );
                            metrics.session_closed();
                            lost_sessions = true;
                        }
                    }
                }

                if lost_sessions {
                    reap_if_empty(&manager, &name).await;
                }
            }
        })
    };

    let redraw_task = tokio::spawn(async move {
        let mut ticker = interval(sim::REDRAW_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            // Build every frame under one read lock, then write with the
            // lock released; a stalled peer only delays its own frame.
            let frames: Vec<(FrameWriter, String)> = {
                let guard = arena.read().await;
                guard
                    .sessions()
                    .map(|session| {
                        let frame =
                            format!("{}{}", term::CLEAR_AND_HOME, render::frame(&guard, session));
                        (session.writer.clone(), frame)
                    })
                    .collect()
            };

            for (writer, frame) in frames {
                send_text(&writer, frame);
            }
        }
    });

    vec![tick_task, redraw_task]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::color::PALETTE;
    use std::time::Duration;

    fn test_manager() -> SharedManager {
        let config = ServerConfig::default();
        ArenaManager::new(config, Arc::new(Metrics::new())).into_shared()
    }

    fn sink_writer() -> FrameWriter {
        Arc::new(Mutex::new(
            Box::new(tokio::io::sink()) as Box<dyn AsyncWrite + Send + Unpin>
        ))
    }

    #[tokio::test]
    async fn test_first_connection_creates_arena() {
        let manager = test_manager();

        let (_, name, _) = place(&manager, sink_writer()).await;

        let mgr = manager.read().await;
        assert_eq!(mgr.arena_count(), 1);
        assert_eq!(mgr.session_count().await, 1);
        assert!(mgr.arenas.contains_key(&name));
    }

    #[tokio::test]
    async fn test_connections_share_an_arena_until_full() {
        let manager = test_manager();

        let mut names = Vec::new();
        for _ in 0..PALETTE.len() {
            let (_, name, _) = place(&manager, sink_writer()).await;
            names.push(name);
        }

        // All six fit in one arena, one color each
        assert!(names.iter().all(|n| n == &names[0]));
        let mgr = manager.read().await;
        assert_eq!(mgr.arena_count(), 1);
        let arena = mgr.arenas[&names[0]].arena.read().await;
        assert!(arena.available_colors().is_empty());
    }

    #[tokio::test]
    async fn test_overflow_opens_second_arena() {
        let manager = test_manager();

        for _ in 0..PALETTE.len() {
            place(&manager, sink_writer()).await;
        }
        let (_, overflow_name, _) = place(&manager, sink_writer()).await;

        let mgr = manager.read().await;
        assert_eq!(mgr.arena_count(), 2);
        assert_eq!(mgr.session_count().await, PALETTE.len() + 1);
        let arena = mgr.arenas[&overflow_name].arena.read().await;
        assert_eq!(arena.session_count(), 1);
    }

    #[tokio::test]
    async fn test_last_disconnect_reaps_arena() {
        let manager = test_manager();
        let (_, name, session_id) = place(&manager, sink_writer()).await;

        disconnect(&manager, &name, session_id).await;

        let mgr = manager.read().await;
        assert_eq!(mgr.arena_count(), 0);
        assert_eq!(mgr.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_noop() {
        let manager = test_manager();
        let (_, name, a) = place(&manager, sink_writer()).await;
        let (_, _, b) = place(&manager, sink_writer()).await;

        disconnect(&manager, &name, a).await;
        disconnect(&manager, &name, a).await;

        let mgr = manager.read().await;
        assert_eq!(mgr.arena_count(), 1);
        assert_eq!(mgr.session_count().await, 1);
        drop(mgr);

        disconnect(&manager, &name, b).await;
        assert_eq!(manager.read().await.arena_count(), 0);
    }

    #[tokio::test]
    async fn test_departure_frees_the_color_for_reuse() {
        let manager = test_manager();
        let (arena, name, first) = place(&manager, sink_writer()).await;

        let first_color = arena.read().await.session(first).unwrap().player.color;
        let (_, _, _) = place(&manager, sink_writer()).await;
        disconnect(&manager, &name, first).await;

        let (_, _, third) = place(&manager, sink_writer()).await;
        let third_color = arena.read().await.session(third).unwrap().player.color;
        assert_eq!(first_color, third_color);
        assert_eq!(manager.read().await.arena_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_admit_and_last_disconnect() {
        let manager = test_manager();

        // Race a disconnect that empties the arena against a fresh
        // admission. Whichever side wins the manager lock, the newcomer must
        // end up in a live arena, never an orphaned one.
        for _ in 0..20 {
            let (_, name, leaver) = place(&manager, sink_writer()).await;

            let leave = {
                let manager = manager.clone();
                let name = name.clone();
                tokio::spawn(async move { disconnect(&manager, &name, leaver).await })
            };
            let join = {
                let manager = manager.clone();
                tokio::spawn(async move { place(&manager, sink_writer()).await })
            };

            leave.await.unwrap();
            let (_, new_name, newcomer) = join.await.unwrap();

            let mgr = manager.read().await;
            assert_eq!(mgr.arena_count(), 1);
            assert_eq!(mgr.session_count().await, 1);
            let arena = mgr.arenas[&new_name].arena.read().await;
            assert!(arena.contains_session(newcomer));
            drop(arena);
            drop(mgr);

            disconnect(&manager, &new_name, newcomer).await;
            assert_eq!(manager.read().await.arena_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_idle_eviction_ends_the_input_task() {
        let config = ServerConfig {
            idle_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let manager = ArenaManager::new(config, Arc::new(Metrics::new())).into_shared();
        let (client, server) = tokio::io::duplex(1 << 20);

        handle_connection(manager.clone(), server);

        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if manager.read().await.session_count().await == 1 {
                break;
            }
            assert!(Instant::now() < deadline, "session never admitted");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Say nothing; the idle clock runs out and the arena empties
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if manager.read().await.arena_count() == 0 {
                break;
            }
            assert!(Instant::now() < deadline, "idle session never evicted");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Eviction must also stop the input task. Once it exits and the
        // stream drops, peer writes start failing; a task still parked on
        // read would keep consuming these bytes forever.
        use tokio::io::AsyncWriteExt;
        let (_client_read, mut client_write) = tokio::io::split(client);
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if client_write.write_all(&[b'x']).await.is_err() {
                break;
            }
            assert!(
                Instant::now() < deadline,
                "input task still reading after eviction"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_handle_connection_quit_key() {
        let manager = test_manager();
        // Roomy buffer: redraw frames queue up until the client drains them
        let (client, server) = tokio::io::duplex(1 << 20);

        handle_connection(manager.clone(), server);

        // Wait for admission
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if manager.read().await.session_count().await == 1 {
                break;
            }
            assert!(Instant::now() < deadline, "session never admitted");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Escape leaves; the arena empties and is reaped
        use tokio::io::AsyncWriteExt;
        let (mut client_read, mut client_write) = tokio::io::split(client);
        client_write.write_all(&[0x1b]).await.unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let mgr = manager.read().await;
            if mgr.arena_count() == 0 && mgr.session_count().await == 0 {
                break;
            }
            drop(mgr);
            assert!(Instant::now() < deadline, "session never cleaned up");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // The peer saw the hide-cursor admission side effect
        let mut received = Vec::new();
        let _ = tokio::time::timeout(
            Duration::from_millis(500),
            client_read.read_to_end(&mut received),
        )
        .await;
        let text = String::from_utf8_lossy(&received);
        assert!(text.contains("\x1b[?25l"));
        assert!(text.contains("~ End of Line ~"));
    }
}
