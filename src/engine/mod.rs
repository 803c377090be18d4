//! Composition of stages into a pipeline and the real-time callback around it.

pub mod callback;
pub mod control;
pub mod pipeline;
#[cfg(feature = "rtrb")]
pub mod record;

pub use callback::{AudioCallback, CallbackFlow};
pub use control::{ControlMessage, ControlPort, Detached, StopHandle};
#[cfg(feature = "rtrb")]
pub use control::{control_channel, ControlChannel, ControlHandle};
pub use pipeline::{EffectPipeline, MeterReading, StageStatus};
#[cfg(feature = "rtrb")]
pub use record::{record_channel, RecordTap, Recorder};
