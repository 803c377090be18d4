pub mod config; // Validated parameters and engine setup
pub mod dsp;
pub mod engine; // Pipeline, callback and control handoff
pub mod error;
pub mod graph; // Block-level effect nodes and stages
pub mod io;

pub use config::{ChainPreset, EngineConfig, StageConfig};
pub use engine::{
    callback::{AudioCallback, CallbackFlow},
    pipeline::{EffectPipeline, MeterReading},
};
pub use error::{Error, Result};

/// Largest block processed in one pass; longer host buffers are chunked.
pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
