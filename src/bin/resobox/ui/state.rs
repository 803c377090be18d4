//! Plain data shown by the UI.

use resobox::{config::StageConfig, engine::StageStatus, graph::StageKind, io::converter::SampleFormat};

/// Fixed facts about the running session, gathered once before the UI starts.
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub input_name: String,
    pub output_name: String,
    pub sample_rate: f32,
    pub block_size: usize,
    pub input_channels: u16,
    pub format: SampleFormat,
    /// Impulse response length, if one was loaded.
    pub impulse_taps: Option<usize>,
}

/// UI-side mirror of one pipeline stage.
#[derive(Clone, Copy, Debug)]
pub struct StageView {
    pub kind: StageKind,
    pub bypassed: bool,
    /// Cannot be switched on (convolution without an impulse response).
    pub inert: bool,
    pub config: Option<StageConfig>,
}

impl From<StageStatus> for StageView {
    fn from(status: StageStatus) -> Self {
        Self {
            kind: status.kind,
            bypassed: status.bypassed,
            inert: status.inert,
            config: status.config,
        }
    }
}
