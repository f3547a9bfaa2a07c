//! Criterion benchmarks for the FFT engine.
//!
//! Run with: cargo bench -p tonogram-core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::f32::consts::PI;
use tonogram_core::{FftEngine, magnitudes, reference_dft};

/// Generate a test signal with multiple harmonics
fn generate_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let i = i as f32;
            let f1 = (2.0 * PI * i / 16.0).sin();
            let f2 = 0.5 * (2.0 * PI * i / 14.0).sin();
            let f3 = 0.25 * (2.0 * PI * i / 9.0).sin();
            (f1 + f2 + f3) * 0.5
        })
        .collect()
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_Engine");

    for size in [256, 1024, 4096, 16384] {
        let window = generate_signal(size);
        let mut engine = FftEngine::new(size).unwrap();

        group.bench_with_input(BenchmarkId::new("transform", size), &window, |b, w| {
            b.iter(|| black_box(engine.transform(w).unwrap()));
        });
    }

    group.finish();
}

fn bench_against_reference(c: &mut Criterion) {
    let mut group = c.benchmark_group("FFT_vs_DFT");

    // Reference DFT is O(n^2); keep sizes small.
    for size in [64, 256] {
        let window = generate_signal(size);
        let mut engine = FftEngine::new(size).unwrap();

        group.bench_with_input(BenchmarkId::new("engine", size), &window, |b, w| {
            b.iter(|| black_box(engine.transform(w).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("reference_dft", size), &window, |b, w| {
            b.iter(|| black_box(reference_dft(w)));
        });
    }

    group.finish();
}

fn bench_magnitudes(c: &mut Criterion) {
    let mut group = c.benchmark_group("Magnitudes");

    let window = generate_signal(4096);
    let mut engine = FftEngine::new(4096).unwrap();
    let spectrum = engine.transform(&window).unwrap();

    group.bench_function("magnitudes_4096", |b| {
        b.iter(|| black_box(magnitudes(&spectrum)));
    });

    group.finish();
}

criterion_group!(benches, bench_engine, bench_against_reference, bench_magnitudes);
criterion_main!(benches);
