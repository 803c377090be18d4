//! Block-level effect nodes built on the DSP primitives.
//!
//! Each node owns one primitive plus its current parameter snapshot and
//! processes a stereo block in place. The pipeline holds them as [`Stage`]
//! variants; `extensions` adds fluent helpers for composing custom chains.

/// Stereo convolution with a shared impulse response.
pub mod convolution;
/// Feedback delay with a fixed-capacity ring buffer.
pub mod delay;
/// Fluent combinators (`.through()`, `.boxed()`).
pub mod extensions;
/// Level tap that leaves the audio untouched.
pub mod meter;
/// Core trait shared by all effect nodes.
pub mod node;
/// Constant-power balance.
pub mod pan;
/// LFO-swept all-pass phaser.
pub mod phaser;
/// Tagged stage variant dispatched by the pipeline.
pub mod stage;
/// Serial chaining of two nodes.
pub mod through;

pub use node::{EffectNode, RenderCtx};
pub use stage::{Stage, StageKind};
