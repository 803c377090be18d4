//! Benchmarks for low-level DSP primitives.

mod convolution;
mod delay;
mod meter;
mod phaser;

pub use convolution::bench_convolution;
pub use delay::bench_delay;
pub use meter::bench_meter;
pub use phaser::bench_phaser;
