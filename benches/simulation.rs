//! Simulation benchmarks for the light cycle server
//!
//! Measures per-tick and per-frame cost at each arena occupancy level to
//! confirm a full arena stays comfortably inside the 60 Hz tick and 15 Hz
//! redraw intervals.
//!
//! Run with: cargo bench --bench simulation

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use lightcycle_server::game::arena::Arena;
use lightcycle_server::game::color::PALETTE;
use lightcycle_server::game::constants::{sim, world};
use lightcycle_server::net::session::{FrameWriter, Session, SessionId};

fn sink_writer() -> FrameWriter {
    Arc::new(Mutex::new(
        Box::new(tokio::io::sink()) as Box<dyn AsyncWrite + Send + Unpin>
    ))
}

/// Create an arena occupied by the given number of players
fn create_arena(count: usize) -> (Arena, Vec<SessionId>) {
    let mut arena = Arena::new("bench".to_string(), world::WIDTH, world::HEIGHT);

    let mut ids = Vec::with_capacity(count);
    for color in PALETTE.iter().take(count) {
        let session = Session::new(sink_writer(), world::WIDTH, world::HEIGHT, *color);
        ids.push(session.id);
        arena
            .admit(session)
            .unwrap_or_else(|e| panic!("admit failed: {e}"));
    }

    (arena, ids)
}

/// Benchmark a full simulation tick at each occupancy level
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    group.sample_size(100);

    for count in [1, 2, 4, 6] {
        let (mut arena, _ids) = create_arena(count);
        let delta_ms = sim::TICK_INTERVAL.as_secs_f64() * 1000.0;

        // Lay down some trail first so collision scans have work to do
        for _ in 0..120 {
            arena.tick(delta_ms);
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("players", count), &count, |b, _| {
            b.iter(|| {
                black_box(arena.tick(black_box(delta_ms)));
            })
        });
    }
    group.finish();
}

/// Benchmark rendering one viewer's frame at each occupancy level
fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(100);

    for count in [1, 2, 4, 6] {
        let (mut arena, ids) = create_arena(count);
        let delta_ms = sim::TICK_INTERVAL.as_secs_f64() * 1000.0;
        for _ in 0..120 {
            arena.tick(delta_ms);
        }
        let viewer = ids[0];

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("frame", count), &count, |b, _| {
            b.iter(|| black_box(arena.render(black_box(viewer))))
        });
    }
    group.finish();
}

/// Benchmark one redraw cycle: a frame for every connected viewer
fn bench_redraw_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("redraw_all");
    group.sample_size(50);

    for count in [2, 4, 6] {
        let (mut arena, ids) = create_arena(count);
        let delta_ms = sim::TICK_INTERVAL.as_secs_f64() * 1000.0;
        for _ in 0..120 {
            arena.tick(delta_ms);
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("viewers", count), &count, |b, _| {
            b.iter(|| {
                for id in &ids {
                    black_box(arena.render(*id));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tick, bench_render, bench_redraw_all);

criterion_main!(benches);
