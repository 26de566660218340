//! Micro-benchmark for connectivity queries over large sparse regions.
//! Run with: cargo run --release --bin bench_connect

use std::time::Instant;

use patchgrid::{SparseGrid, TileCoord, is_adjacent, is_connected};
use rand::Rng;
use rand::SeedableRng;

const RUNS: usize = 5;
const WALK_STEPS: usize = 50_000;
const ADJACENCY_PROBES: usize = 100_000;

/// Build one connected region by random-walking a 2×2 brush from the middle
/// of a large coordinate space.
fn build_walk_region(steps: usize, seed: u64) -> SparseGrid {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let mut grid = SparseGrid::new();
    let mut x: u32 = 1 << 16;
    let mut y: u32 = 1 << 16;
    // Keep the brush off tile boundaries by stepping one pixel at a time.
    for _ in 0..steps {
        let lx = x % 16;
        let ly = y % 16;
        let size = if lx == 15 || ly == 15 { 1 } else { 2 };
        grid.set(x, y, size).expect("walk stays in range");
        match rng.random_range(0..4u8) {
            0 => x += 1,
            1 => x = x.saturating_sub(1).max(1),
            2 => y += 1,
            _ => y = y.saturating_sub(1).max(1),
        }
    }
    grid
}

fn bench_is_connected(grid: &SparseGrid) {
    let mut best = f64::MAX;
    for _ in 0..RUNS {
        let start = Instant::now();
        let connected = is_connected(grid);
        let elapsed = start.elapsed().as_secs_f64() * 1e3;
        assert!(connected, "random walk must stay connected");
        best = best.min(elapsed);
    }
    println!(
        "is_connected    tiles={:6}  pixels={:8}  best={best:9.3} ms",
        grid.len(),
        grid.entries()
            .iter()
            .map(|entry| entry.tile().population() as u64)
            .sum::<u64>(),
    );
}

fn bench_is_adjacent(grid: &SparseGrid, seed: u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let coords: Vec<TileCoord> = grid.entries().iter().map(|entry| entry.coord()).collect();
    let mut best = f64::MAX;
    let mut hits = 0usize;
    for _ in 0..RUNS {
        hits = 0;
        let start = Instant::now();
        for _ in 0..ADJACENCY_PROBES {
            let coord = coords[rng.random_range(0..coords.len())];
            let (ox, oy) = coord.origin();
            let probe_x = ox + rng.random_range(0..12u32);
            let probe_y = oy + rng.random_range(0..12u32);
            if is_adjacent(grid, probe_x, probe_y, 4).expect("probe rect is valid") {
                hits += 1;
            }
        }
        let elapsed = start.elapsed().as_secs_f64() * 1e3;
        best = best.min(elapsed);
    }
    println!(
        "is_adjacent     probes={ADJACENCY_PROBES}  hits={hits:6}  best={best:9.3} ms",
    );
}

fn main() {
    let grid = build_walk_region(WALK_STEPS, 0xC0FFEE);
    bench_is_connected(&grid);
    bench_is_adjacent(&grid, 0xBEEF);
}
