//! Benchmarks for partitioned convolution.
//!
//! Cost per block should grow with the number of partitions, not with the
//! square of the impulse length.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resobox::dsp::convolution::{ConvolutionEngine, ImpulseResponse};

use crate::BLOCK_SIZES;

fn decaying_impulse(taps: usize) -> ImpulseResponse {
    let coefficients: Vec<f32> = (0..taps)
        .map(|i| (-(i as f32) / (taps as f32 / 6.0)).exp() * ((i * 7919) % 13) as f32 / 13.0)
        .collect();
    ImpulseResponse::from(coefficients)
}

pub fn bench_convolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/convolution");

    // Short plate, small room, one second hall at 44.1kHz.
    let impulse_lengths: &[usize] = &[512, 8_192, 44_100];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut buffer = input.clone();

        for &taps in impulse_lengths {
            let mut engine = ConvolutionEngine::new(size);
            if engine.configure(&decaying_impulse(taps)).is_err() {
                continue;
            }
            group.bench_with_input(BenchmarkId::new(format!("{taps}_taps"), size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    engine.process(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
