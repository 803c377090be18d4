//! Benchmarks for the ring delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resobox::dsp::{delay::RingDelayLine, frame::Frame};

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_times_ms: &[f32] = &[10.0, 100.0, 1000.0];

    for &size in BLOCK_SIZES {
        let input: Vec<Frame> = (0..size)
            .map(|i| Frame::mono((i as f32 * 0.1).sin()))
            .collect();

        for &delay_ms in delay_times_ms {
            let mut line = RingDelayLine::with_max_delay(2000.0, 44_100.0);
            group.bench_with_input(
                BenchmarkId::new(format!("process_{}ms", delay_ms as u32), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        let mut acc = 0.0f32;
                        for &frame in &input {
                            acc += line.process(black_box(frame), delay_ms, 0.5, 0.5).left;
                        }
                        acc
                    })
                },
            );
        }

        // Offset resolved once per block, as the delay node does.
        let mut line = RingDelayLine::with_max_delay(2000.0, 44_100.0);
        let offset = line.offset_samples(500.0);
        group.bench_with_input(BenchmarkId::new("process_offset", size), &size, |b, _| {
            b.iter(|| {
                let mut acc = 0.0f32;
                for &frame in &input {
                    acc += line.process_offset(black_box(frame), offset, 0.5, 0.5).left;
                }
                acc
            })
        });
    }

    group.finish();
}
