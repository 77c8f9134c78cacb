//! Benchmarks for the classification query path.
//!
//! Classification is the agent's dominant cost center: up to four
//! satisfiability queries per cell, a full-grid sweep per turn.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use spelunk::grid::{Cell, Grid};
use spelunk::infer::HazardInference;
use spelunk::world::Percept;

fn quiet() -> Percept {
    Percept::default()
}

fn breezy() -> Percept {
    Percept {
        breeze: true,
        ..Percept::default()
    }
}

/// A mid-exploration 8x8 knowledge base: a column of quiet cells plus one
/// breeze, the shape a real episode produces after a handful of turns.
fn mid_exploration() -> HazardInference {
    let mut inference = HazardInference::new(Grid::new(8)).unwrap();
    inference.observe(Cell::new(7, 0), quiet()).unwrap();
    inference.observe(Cell::new(6, 0), quiet()).unwrap();
    inference.observe(Cell::new(7, 1), quiet()).unwrap();
    inference.observe(Cell::new(6, 1), quiet()).unwrap();
    inference.observe(Cell::new(5, 0), breezy()).unwrap();
    inference
}

fn bench_classify_sweep(c: &mut Criterion) {
    c.bench_function("classify_sweep_8x8", |b| {
        b.iter_batched(
            mid_exploration,
            |mut inference| {
                for cell in Grid::new(8).cells() {
                    black_box(inference.classify(cell).unwrap());
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_frontier_rebuild(c: &mut Criterion) {
    c.bench_function("safe_frontier_8x8", |b| {
        b.iter_batched(
            mid_exploration,
            |mut inference| black_box(inference.safe_frontier().unwrap()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_classify_sweep, bench_frontier_rebuild);
criterion_main!(benches);
