//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Everything here processes one frame or one block at a time against state
//! allocated up front, so the primitives can run inside the audio callback.
//! They stay focused on the signal-processing math; parameter validation and
//! stage orchestration live in `config` and `graph`.

/// Partitioned overlap-add convolution with an impulse response.
pub mod convolution;
/// Stereo feedback delay on a ring buffer.
pub mod delay;
/// Stereo sample pair.
pub mod frame;
/// LFO phase accumulator and shape helpers.
pub mod lfo;
/// RMS metering and moving-average smoothing.
pub mod meter;
/// Wet/dry blending and constant-power balance.
pub mod mix;
/// LFO-swept all-pass cascade.
pub mod phaser;

pub use convolution::{ConvolutionEngine, ImpulseResponse};
pub use delay::RingDelayLine;
pub use frame::Frame;
pub use meter::{LevelMeter, RmsHistory};
pub use phaser::PhaserChain;
