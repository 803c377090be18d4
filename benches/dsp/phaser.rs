//! Benchmarks for the all-pass phaser cascade.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resobox::dsp::{frame::Frame, lfo::rate_from_hz, phaser::PhaserChain};

use crate::BLOCK_SIZES;

pub fn bench_phaser(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/phaser");
    let rate = rate_from_hz(0.5, 44_100.0);

    for &size in BLOCK_SIZES {
        let input: Vec<Frame> = (0..size)
            .map(|i| Frame::mono((i as f32 * 0.1).sin()))
            .collect();

        for &stages in &[2usize, 4, 12] {
            let mut chain = PhaserChain::new(stages);
            group.bench_with_input(
                BenchmarkId::new(format!("{stages}_stages"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut acc = 0.0f32;
                        for &frame in &input {
                            acc += chain.process(black_box(frame), rate, 0.6, 0.3, 0.5).left;
                        }
                        acc
                    })
                },
            );
        }
    }

    group.finish();
}
