//! Server observability counters.
//!
//! Two gauges (active sessions, active arenas) plus a rolling window of
//! simulation tick durations. Read by the periodic stats log in `main`;
//! nothing in the simulation depends on these.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;

const TICK_HISTORY_LEN: usize = 256;

#[derive(Debug)]
pub struct Metrics {
    pub sessions_active: AtomicU64,
    pub arenas_active: AtomicU64,
    pub sessions_total: AtomicU64,
    pub ticks_total: AtomicU64,

    start_time: Instant,
    tick_history_us: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sessions_active: AtomicU64::new(0),
            arenas_active: AtomicU64::new(0),
            sessions_total: AtomicU64::new(0),
            ticks_total: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history_us: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    pub fn session_opened(&self) {
        self.sessions_active.fetch_add(1, Ordering::Relaxed);
        self.sessions_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_closed(&self) {
        self.sessions_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn arena_opened(&self) {
        self.arenas_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn arena_closed(&self) {
        self.arenas_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_tick(&self, elapsed: Duration) {
        self.ticks_total.fetch_add(1, Ordering::Relaxed);
        let mut history = self.tick_history_us.write();
        if history.len() >= TICK_HISTORY_LEN {
            history.pop_front();
        }
        history.push_back(elapsed.as_micros() as u64);
    }

    /// Mean tick duration over the rolling window, in microseconds
    pub fn tick_mean_us(&self) -> u64 {
        let history = self.tick_history_us.read();
        if history.is_empty() {
            return 0;
        }
        history.iter().sum::<u64>() / history.len() as u64
    }

    /// Worst tick in the rolling window, in microseconds
    pub fn tick_max_us(&self) -> u64 {
        self.tick_history_us.read().iter().copied().max().unwrap_or(0)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
