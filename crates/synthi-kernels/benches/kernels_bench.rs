//! Criterion benchmarks for synthi-kernels
//!
//! Run with: cargo bench -p synthi-kernels
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use synthi_core::{Kernel, ParamBlock, WindowSize};
use synthi_kernels::{ColourNoiseSource, OutputStage, PhaseOscillator, TriggerCapture};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("PhaseOscillator");

    for &block_size in BLOCK_SIZES {
        let curve: Vec<f32> = (0..block_size).map(|i| 220.0 + i as f32).collect();

        group.bench_with_input(
            BenchmarkId::new("multi_constant", block_size),
            &block_size,
            |b, &n| {
                let mut osc = PhaseOscillator::new(SAMPLE_RATE);
                let mut bufs = vec![vec![0.0f32; n]; 4];
                let params = [ParamBlock::Constant(440.0)];
                b.iter(|| {
                    let mut outputs: Vec<&mut [f32]> =
                        bufs.iter_mut().map(Vec::as_mut_slice).collect();
                    black_box(osc.process(&[], &mut outputs, black_box(&params)));
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("multi_audio_rate", block_size),
            &block_size,
            |b, &n| {
                let mut osc = PhaseOscillator::new(SAMPLE_RATE);
                let mut bufs = vec![vec![0.0f32; n]; 4];
                let symmetry = vec![0.8f32; n];
                let params = [
                    ParamBlock::PerSample(&curve),
                    ParamBlock::Constant(0.0),
                    ParamBlock::Constant(0.5),
                    ParamBlock::PerSample(&symmetry),
                ];
                b.iter(|| {
                    let mut outputs: Vec<&mut [f32]> =
                        bufs.iter_mut().map(Vec::as_mut_slice).collect();
                    black_box(osc.process(&[], &mut outputs, black_box(&params)));
                });
            },
        );
    }

    group.finish();
}

fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("ColourNoiseSource");

    for &block_size in BLOCK_SIZES {
        for (name, colour) in [("bypass", 0.0f32), ("dark", -1.0)] {
            group.bench_with_input(BenchmarkId::new(name, block_size), &block_size, |b, &n| {
                let mut noise = ColourNoiseSource::new(SAMPLE_RATE);
                let mut out = vec![0.0f32; n];
                let params = [ParamBlock::Constant(colour)];
                b.iter(|| black_box(noise.process(&[], &mut [&mut out], &params)));
            });
        }
    }

    group.finish();
}

fn bench_output_stage(c: &mut Criterion) {
    let mut group = c.benchmark_group("OutputStage");

    for &block_size in BLOCK_SIZES {
        let signal: Vec<f32> = (0..block_size).map(|i| (i as f32 * 0.05).sin()).collect();
        let cv: Vec<f32> = (0..block_size).map(|i| -(i as f32) / block_size as f32).collect();

        group.bench_with_input(BenchmarkId::new("block_gain", block_size), &block_size, |b, &n| {
            let mut stage = OutputStage::new(SAMPLE_RATE);
            let (mut m, mut l, mut r) = (vec![0.0f32; n], vec![0.0f32; n], vec![0.0f32; n]);
            let params = [ParamBlock::Constant(-0.4), ParamBlock::Constant(7.0)];
            b.iter(|| black_box(stage.process(&[&signal], &mut [&mut m, &mut l, &mut r], &params)));
        });

        group.bench_with_input(BenchmarkId::new("audio_rate_cv", block_size), &block_size, |b, &n| {
            let mut stage = OutputStage::new(SAMPLE_RATE);
            let (mut m, mut l, mut r) = (vec![0.0f32; n], vec![0.0f32; n], vec![0.0f32; n]);
            let params = [ParamBlock::Constant(-0.4), ParamBlock::Constant(7.0)];
            b.iter(|| {
                black_box(stage.process(&[&signal, &cv], &mut [&mut m, &mut l, &mut r], &params))
            });
        });
    }

    group.finish();
}

fn bench_trigger_capture(c: &mut Criterion) {
    let signal: Vec<f32> = (0..128).map(|i| (i as f32 * 0.0576).sin()).collect();
    c.bench_function("TriggerCapture/128_into_1024", |b| {
        let mut scope = TriggerCapture::new(SAMPLE_RATE, WindowSize::W1024);
        b.iter(|| black_box(scope.process(&[&signal, &signal], &mut [], &[])));
    });
}

criterion_group!(
    benches,
    bench_oscillator,
    bench_noise,
    bench_output_stage,
    bench_trigger_capture
);
criterion_main!(benches);
