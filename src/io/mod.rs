// Purpose - external interfaces, format conversions

pub mod converter;
pub mod wav;

pub use converter::{AudioSample, SampleFormat};
pub use wav::{load_impulse, recording_path, ImpulseInfo, ImpulseReader, RecordingInfo, RecordingWriter};
