//! Benchmarks for the startup generation path and the per-frame rain update.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neondrift::prelude::*;
use neondrift::{city, rain::RainPool};

fn bench_city_generation(c: &mut Criterion) {
    let cfg = CityConfig::default();
    c.bench_function("city_generate_300", |b| {
        b.iter(|| {
            let mut sampler = Sampler::seeded(7);
            black_box(city::generate(&cfg, &mut sampler))
        })
    });
}

fn bench_rain_advance(c: &mut Criterion) {
    let cfg = RainConfig::default();
    let mut sampler = Sampler::seeded(7);
    let mut pool = RainPool::new(&cfg, &mut sampler);
    c.bench_function("rain_advance_10k", |b| {
        b.iter(|| {
            pool.advance(black_box(Vec2::new(0.0, -50.0)), &mut sampler);
        })
    });
}

criterion_group!(benches, bench_city_generation, bench_rain_advance);
criterion_main!(benches);
