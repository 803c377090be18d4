//! Validated effect parameters and engine configuration.
//!
//! Parameter structs can only be built through their `new` constructors,
//! which reject out-of-range values. Once built they are plain `Copy` data,
//! cheap to hand to the audio thread as a whole snapshot.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        delay::MAX_FEEDBACK,
        lfo::rate_from_hz,
        phaser::{MAX_LOOP_GAIN, MAX_MOD_DEPTH, MAX_PHASER_FEEDBACK, MAX_RATE, MAX_STAGES},
    },
    error::{ensure_range, Error, Result},
    io::converter::SampleFormat,
    MAX_BLOCK_SIZE,
};

/// Longest delay time accepted by any configuration, in milliseconds.
pub const MAX_DELAY_TIME_MS: f32 = 10_000.0;
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;
pub const MAX_SAMPLE_RATE: f32 = 384_000.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "raw::DelayParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayParams {
    time_ms: f32,
    feedback: f32,
    mix: f32,
}

impl DelayParams {
    pub fn new(time_ms: f32, feedback: f32, mix: f32) -> Result<Self> {
        Ok(Self {
            time_ms: ensure_range("delay_time_ms", time_ms, 0.0, MAX_DELAY_TIME_MS)?,
            feedback: ensure_range("delay_feedback", feedback, 0.0, MAX_FEEDBACK)?,
            mix: ensure_range("delay_mix", mix, 0.0, 1.0)?,
        })
    }

    pub fn time_ms(&self) -> f32 {
        self.time_ms
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }
}

impl Default for DelayParams {
    fn default() -> Self {
        Self {
            time_ms: 500.0,
            feedback: 0.5,
            mix: 0.5,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "raw::PhaserParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaserParams {
    rate: f64,
    depth: f32,
    feedback: f32,
    mix: f32,
    stages: usize,
}

impl PhaserParams {
    /// `rate` is the LFO increment in cycles per sample.
    pub fn new(rate: f64, depth: f32, feedback: f32, mix: f32, stages: usize) -> Result<Self> {
        if !(0.0..=MAX_RATE).contains(&rate) {
            return Err(Error::OutOfRange {
                name: "phaser_rate",
                value: rate as f32,
                min: 0.0,
                max: MAX_RATE as f32,
            });
        }
        if !(1..=MAX_STAGES).contains(&stages) {
            return Err(Error::InvalidStageCount(stages));
        }
        let depth = ensure_range("phaser_depth", depth, -MAX_MOD_DEPTH, MAX_MOD_DEPTH)?;
        let feedback = ensure_range("phaser_feedback", feedback, 0.0, MAX_PHASER_FEEDBACK)?;
        // The feedback loop only decays while feedback + |depth| stays below one.
        ensure_range("phaser_feedback", feedback, 0.0, MAX_LOOP_GAIN - depth.abs())?;
        Ok(Self {
            rate,
            depth,
            feedback,
            mix: ensure_range("phaser_mix", mix, 0.0, 1.0)?,
            stages,
        })
    }

    /// Build from an LFO frequency in Hz.
    pub fn from_hz(
        rate_hz: f32,
        sample_rate: f32,
        depth: f32,
        feedback: f32,
        mix: f32,
        stages: usize,
    ) -> Result<Self> {
        Self::new(rate_from_hz(rate_hz, sample_rate), depth, feedback, mix, stages)
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn stages(&self) -> usize {
        self.stages
    }
}

impl Default for PhaserParams {
    fn default() -> Self {
        Self {
            rate: rate_from_hz(0.5, 44_100.0),
            depth: 0.6,
            feedback: 0.3,
            mix: 0.5,
            stages: 4,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "raw::ConvolutionParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvolutionParams {
    mix: f32,
}

impl ConvolutionParams {
    pub fn new(mix: f32) -> Result<Self> {
        Ok(Self {
            mix: ensure_range("convolution_mix", mix, 0.0, 1.0)?,
        })
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }
}

impl Default for ConvolutionParams {
    fn default() -> Self {
        Self { mix: 1.0 }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "raw::PanParams"))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanParams {
    balance: f32,
}

impl PanParams {
    /// `balance`: 0.0 = hard left, 0.5 = centre, 1.0 = hard right.
    pub fn new(balance: f32) -> Result<Self> {
        Ok(Self {
            balance: ensure_range("pan_balance", balance, 0.0, 1.0)?,
        })
    }

    pub fn balance(&self) -> f32 {
        self.balance
    }
}

impl Default for PanParams {
    fn default() -> Self {
        Self { balance: 0.5 }
    }
}

/// One entry of the processing chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageConfig {
    Delay(DelayParams),
    Phaser(PhaserParams),
    Convolution(ConvolutionParams),
    Pan(PanParams),
    Meter,
}

impl fmt::Display for StageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageConfig::Delay(p) => write!(
                f,
                "{:.0} ms  fb {:.2}  mix {:.2}",
                p.time_ms, p.feedback, p.mix
            ),
            StageConfig::Phaser(p) => write!(
                f,
                "{} stages  depth {:.2}  fb {:.2}  mix {:.2}",
                p.stages, p.depth, p.feedback, p.mix
            ),
            StageConfig::Convolution(p) => write!(f, "mix {:.2}", p.mix),
            StageConfig::Pan(p) => write!(f, "balance {:.2}", p.balance),
            StageConfig::Meter => Ok(()),
        }
    }
}

/// Unchecked mirrors of the parameter structs; deserializing goes through
/// the validating constructors.
#[cfg(feature = "serde")]
mod raw {
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct DelayParams {
        pub time_ms: f32,
        pub feedback: f32,
        pub mix: f32,
    }

    #[derive(Deserialize)]
    pub struct PhaserParams {
        pub rate: f64,
        pub depth: f32,
        pub feedback: f32,
        pub mix: f32,
        pub stages: usize,
    }

    #[derive(Deserialize)]
    pub struct ConvolutionParams {
        pub mix: f32,
    }

    #[derive(Deserialize)]
    pub struct PanParams {
        pub balance: f32,
    }
}

#[cfg(feature = "serde")]
impl TryFrom<raw::DelayParams> for DelayParams {
    type Error = Error;

    fn try_from(raw: raw::DelayParams) -> Result<Self> {
        Self::new(raw.time_ms, raw.feedback, raw.mix)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<raw::PhaserParams> for PhaserParams {
    type Error = Error;

    fn try_from(raw: raw::PhaserParams) -> Result<Self> {
        Self::new(raw.rate, raw.depth, raw.feedback, raw.mix, raw.stages)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<raw::ConvolutionParams> for ConvolutionParams {
    type Error = Error;

    fn try_from(raw: raw::ConvolutionParams) -> Result<Self> {
        Self::new(raw.mix)
    }
}

#[cfg(feature = "serde")]
impl TryFrom<raw::PanParams> for PanParams {
    type Error = Error;

    fn try_from(raw: raw::PanParams) -> Result<Self> {
        Self::new(raw.balance)
    }
}

/// Ready-made chains.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainPreset {
    /// Feedback delay alone.
    #[default]
    Echo,
    /// Delay followed by phaser.
    EchoPhaser,
    /// Convolution alone.
    Room,
    /// Convolution, delay, then phaser.
    Full,
}

impl ChainPreset {
    pub fn stages(self) -> Vec<StageConfig> {
        match self {
            ChainPreset::Echo => vec![StageConfig::Delay(DelayParams::default())],
            ChainPreset::EchoPhaser => vec![
                StageConfig::Delay(DelayParams::default()),
                StageConfig::Phaser(PhaserParams::default()),
            ],
            ChainPreset::Room => vec![StageConfig::Convolution(ConvolutionParams::default())],
            ChainPreset::Full => vec![
                StageConfig::Convolution(ConvolutionParams { mix: 0.5 }),
                StageConfig::Delay(DelayParams::default()),
                StageConfig::Phaser(PhaserParams::default()),
            ],
        }
    }
}

/// Everything needed to build a pipeline and its callback.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Frames per callback block; scratch buffers are sized from this.
    pub block_size: usize,
    /// Negotiated input channel count, 1 or 2.
    pub input_channels: u16,
    pub sample_format: SampleFormat,
    /// Delay line capacity in milliseconds.
    pub max_delay_ms: f32,
    /// Compute input/output RMS every block.
    pub metering: bool,
    pub chain: Vec<StageConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            block_size: 128,
            input_channels: 1,
            sample_format: SampleFormat::F32,
            max_delay_ms: 2_000.0,
            metering: true,
            chain: ChainPreset::Echo.stages(),
        }
    }
}

impl EngineConfig {
    pub fn with_preset(preset: ChainPreset) -> Self {
        Self {
            chain: preset.stages(),
            ..Self::default()
        }
    }

    /// Block size actually used for scratch buffers.
    pub fn scratch_frames(&self) -> usize {
        self.block_size.min(MAX_BLOCK_SIZE)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_range("sample_rate", self.sample_rate, MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)?;
        if self.block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }
        if !matches!(self.input_channels, 1 | 2) {
            return Err(Error::UnsupportedChannels(self.input_channels));
        }
        ensure_range("max_delay_ms", self.max_delay_ms, 1.0, MAX_DELAY_TIME_MS)?;
        for stage in &self.chain {
            if let StageConfig::Delay(params) = stage {
                ensure_range("delay_time_ms", params.time_ms(), 0.0, self.max_delay_ms)?;
            }
        }
        Ok(())
    }
}
