//! Benchmarks for complete effect chains.
//!
//! Each preset is run through `AudioCallback::process` exactly as the host
//! binary drives it, with mono input and interleaved stereo output.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use resobox::{
    dsp::convolution::ImpulseResponse, AudioCallback, ChainPreset, EffectPipeline, EngineConfig,
};

use crate::BLOCK_SIZES;

fn room_impulse() -> ImpulseResponse {
    let coefficients: Vec<f32> = (0..22_050)
        .map(|i| (-(i as f32) / 4_000.0).exp() * if i % 3 == 0 { 0.6 } else { -0.3 })
        .collect();
    ImpulseResponse::from(coefficients)
}

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/pipeline");
    let impulse = room_impulse();

    let presets = [
        ("echo", ChainPreset::Echo),
        ("echo_phaser", ChainPreset::EchoPhaser),
        ("room", ChainPreset::Room),
        ("full", ChainPreset::Full),
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let input_i16: Vec<i16> = input.iter().map(|&s| (s * 32_767.0) as i16).collect();
        let mut output = vec![0.0f32; size * 2];
        let mut output_i16 = vec![0i16; size * 2];

        for (name, preset) in presets {
            let config = EngineConfig {
                block_size: size,
                ..EngineConfig::with_preset(preset)
            };
            let Ok(pipeline) = EffectPipeline::from_config(&config, Some(&impulse)) else {
                continue;
            };
            let Ok(mut callback) = AudioCallback::new(pipeline, 1, size) else {
                continue;
            };

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| callback.process(black_box(&input), black_box(&mut output)))
            });
        }

        // Integer device format adds conversion at both edges.
        let config = EngineConfig {
            block_size: size,
            ..EngineConfig::with_preset(ChainPreset::EchoPhaser)
        };
        if let Ok(pipeline) = EffectPipeline::from_config(&config, None) {
            if let Ok(mut callback) = AudioCallback::new(pipeline, 1, size) {
                group.bench_with_input(BenchmarkId::new("echo_phaser_i16", size), &size, |b, _| {
                    b.iter(|| callback.process(black_box(&input_i16), black_box(&mut output_i16)))
                });
            }
        }
    }

    group.finish();
}
