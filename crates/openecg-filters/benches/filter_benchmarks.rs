//! Filter Benchmarks
//!
//! Criterion benchmarks for the per-sample filter path and lead derivation.

use criterion::{Criterion, criterion_group, criterion_main};
use openecg_filters::prelude::*;

fn bench_engine_filter(c: &mut Criterion) {
    let Ok(mut engine) = FilterEngine::new(FilterConfig::default()) else {
        return;
    };
    let sample = [0.1, 0.2, 0.3];

    c.bench_function("engine_filter", |b| {
        b.iter(|| std::hint::black_box(engine.filter(std::hint::black_box(sample))))
    });
}

fn bench_sos_step(c: &mut Criterion) {
    let Ok(filter) = butterworth_bandpass(BANDPASS_ORDER, 0.5, 40.0, 100.0) else {
        return;
    };
    let mut state = SosState::step_response_steady(&filter);

    c.bench_function("sos_step", |b| {
        b.iter(|| std::hint::black_box(filter.step(std::hint::black_box(0.5), &mut state)))
    });
}

fn bench_derive_leads(c: &mut Criterion) {
    c.bench_function("derive_leads", |b| {
        b.iter(|| std::hint::black_box(derive_leads(std::hint::black_box([0.1, 0.2, 0.3]))))
    });
}

fn bench_design(c: &mut Criterion) {
    let config = FilterConfig::default();
    c.bench_function("filter_design", |b| {
        b.iter(|| std::hint::black_box(std::hint::black_box(config).design()))
    });
}

criterion_group!(
    benches,
    bench_engine_filter,
    bench_sos_step,
    bench_derive_leads,
    bench_design
);
criterion_main!(benches);
