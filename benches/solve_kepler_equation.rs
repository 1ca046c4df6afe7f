use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orrery::kepler::{solve_barker, solve_kepler};

/// Uniform random in [-π, π)
#[inline]
fn rand_anomaly(rng: &mut StdRng) -> f64 {
    rng.random::<f64>() * std::f64::consts::TAU - std::f64::consts::PI
}

fn random_cases(seed: u64, eccentricities: std::ops::Range<f64>) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..10_000)
        .map(|_| {
            let e = rng.random_range(eccentricities.clone());
            (e, rand_anomaly(&mut rng))
        })
        .collect()
}

/// Planets and most moons: e ∈ [0.0, 0.3)
fn bench_low_e(c: &mut Criterion) {
    c.bench_function("solve_kepler/low_e<0.3", |b| {
        b.iter_batched(
            || random_cases(0xDEADBEEF, 0.0..0.3),
            |cases| {
                for (e, m) in cases {
                    black_box(solve_kepler(black_box(e), black_box(m)).ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Comets: e ∈ [0.3, 0.99)
fn bench_high_e(c: &mut Criterion) {
    c.bench_function("solve_kepler/high_e_0.3..0.99", |b| {
        b.iter_batched(
            || random_cases(0xBADF00D, 0.3..0.99),
            |cases| {
                for (e, m) in cases {
                    black_box(solve_kepler(black_box(e), black_box(m)).ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Open orbits: e ∈ [1.01, 3.0)
fn bench_hyperbolic(c: &mut Criterion) {
    c.bench_function("solve_kepler/hyperbolic_1.01..3", |b| {
        b.iter_batched(
            || random_cases(0xFEEDFACE, 1.01..3.0),
            |cases| {
                for (e, m) in cases {
                    black_box(solve_kepler(black_box(e), black_box(m)).ok());
                }
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_barker(c: &mut Criterion) {
    c.bench_function("solve_barker/fixed", |b| {
        b.iter(|| black_box(solve_barker(black_box(1.234))))
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_low_e, bench_high_e, bench_hyperbolic, bench_barker
);
criterion_main!(benches);
