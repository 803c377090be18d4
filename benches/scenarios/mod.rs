//! Real-world scenario benchmarks.
//!
//! These run the chain presets end to end through the audio callback,
//! including deinterleaving, metering and sample conversion.

mod pipeline;

pub use pipeline::bench_pipeline;
