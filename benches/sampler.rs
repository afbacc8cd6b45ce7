#[macro_use]
extern crate criterion;
extern crate buddhafarm;
extern crate num;

use buddhafarm::coordinator::{Coordinator, UNBOUNDED};
use buddhafarm::sampler::{inside_cardioids, sample_orbit, Orbit};
use criterion::{black_box, Criterion};
use num::Complex;

fn bench_exclusion(c: &mut Criterion) {
    c.bench_function("cardioid check", |b| {
        b.iter(|| inside_cardioids(black_box(Complex::new(-0.1, 0.65))))
    });
}

fn bench_escaping_orbit(c: &mut Criterion) {
    c.bench_function("escaping orbit", |b| {
        let mut orbit = Orbit::with_capacity(2_000);
        b.iter(|| sample_orbit(black_box(Complex::new(0.5, 0.5)), 2_000, &mut orbit))
    });
}

fn bench_full_budget_orbit(c: &mut Criterion) {
    c.bench_function("never-escaping orbit", |b| {
        let mut orbit = Orbit::with_capacity(2_000);
        b.iter(|| sample_orbit(black_box(Complex::new(-0.12, 0.25)), 2_000, &mut orbit))
    });
}

fn bench_reserve_batch(c: &mut Criterion) {
    c.bench_function("reserve batch", |b| {
        let coordinator = Coordinator::new();
        coordinator.begin_round(0, UNBOUNDED);
        b.iter(|| coordinator.reserve_batch(black_box(1_000)))
    });
}

criterion_group!(
    benches,
    bench_exclusion,
    bench_escaping_orbit,
    bench_full_budget_orbit,
    bench_reserve_batch
);
criterion_main!(benches);
