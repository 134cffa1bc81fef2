//! Criterion benchmarks for synthi-core primitives
//!
//! Run with: cargo bench -p synthi-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use synthi_core::{ParamBlock, RcToneFilter, db_to_linear, equal_power_pan};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5
        })
        .collect()
}

fn bench_rc_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("RcToneFilter");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        let curve: Vec<f32> = (0..block_size)
            .map(|i| i as f32 / block_size as f32 * 2.0 - 1.0)
            .collect();

        group.bench_with_input(BenchmarkId::new("block_rate", block_size), &block_size, |b, _| {
            let mut filter = RcToneFilter::from_components(SAMPLE_RATE, 4700.0, 10e-9);
            b.iter(|| {
                let (b0, b1) = filter.coefficients(black_box(-0.5));
                for &sample in &input {
                    black_box(filter.process_with(black_box(sample), b0, b1));
                }
                filter.flush();
            });
        });

        group.bench_with_input(BenchmarkId::new("audio_rate", block_size), &block_size, |b, _| {
            let mut filter = RcToneFilter::from_components(SAMPLE_RATE, 4700.0, 10e-9);
            let position = ParamBlock::PerSample(&curve);
            b.iter(|| {
                for (i, &sample) in input.iter().enumerate() {
                    black_box(filter.process(black_box(sample), position.at(i)));
                }
                filter.flush();
            });
        });
    }

    group.finish();
}

fn bench_math(c: &mut Criterion) {
    c.bench_function("db_to_linear", |b| b.iter(|| black_box(db_to_linear(black_box(-37.5)))));
    c.bench_function("equal_power_pan", |b| b.iter(|| black_box(equal_power_pan(black_box(0.3)))));
}

criterion_group!(benches, bench_rc_filter, bench_math);
criterion_main!(benches);
