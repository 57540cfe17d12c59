//! Lifting throughput over seeded random games.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pgsolve_core::GameSolver;
use pgsolve_games::generator::random_game;
use pgsolve_spm::SmallProgressMeasures;

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("spm-solve");
    for &n in &[64usize, 256, 1024] {
        let game = random_game(n, 6, 1, 4, 42).expect("generated game");
        group.bench_with_input(BenchmarkId::from_parameter(n), &game, |b, g| {
            b.iter(|| GameSolver::<SmallProgressMeasures>::solve(g).expect("solve"));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solve);
criterion_main!(benches);
