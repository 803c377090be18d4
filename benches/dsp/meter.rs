//! Benchmarks for block RMS metering.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resobox::dsp::meter::{LevelMeter, RmsHistory};

use crate::BLOCK_SIZES;

pub fn bench_meter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/meter");
    let meter = LevelMeter::new();

    for &size in BLOCK_SIZES {
        let left: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let right: Vec<f32> = (0..size).map(|i| (i as f32 * 0.13).cos()).collect();

        group.bench_with_input(BenchmarkId::new("measure_stereo", size), &size, |b, _| {
            b.iter(|| meter.measure_stereo(black_box(&left), black_box(&right)))
        });
    }

    let mut history = RmsHistory::default();
    group.bench_function("history_push", |b| {
        b.iter(|| history.push(black_box(0.3)))
    });

    group.finish();
}
