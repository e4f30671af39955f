use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use minegrid_core::*;

fn tiers() -> [(&'static str, GameConfig); 3] {
    [
        ("beginner", GameConfig::beginner()),
        ("intermediate", GameConfig::intermediate()),
        ("expert", GameConfig::expert()),
    ]
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for (name, config) in tiers() {
        let start = (config.height() / 2, config.width() / 2);
        let mut seed = 0u64;
        group.bench_function(name, |b| {
            b.iter(|| {
                seed = seed.wrapping_add(1);
                ScatterGenerator::new(seed, Some(start)).generate(black_box(config))
            })
        });
    }
    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("flood_fill");
    for size in [(16, 30), (128, 128), (255, 255)] {
        let board = Board::empty(size);
        group.bench_function(format!("{}x{}", size.0, size.1), |b| {
            b.iter(|| {
                let mut board = board.clone();
                board.reveal_tile((0, 0));
                black_box(board.reveal_cascade((0, 0)))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_flood_fill);
criterion_main!(benches);
