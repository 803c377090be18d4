#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::{EngineConfig, StageConfig},
    dsp::{convolution::ImpulseResponse, meter::LevelMeter},
    engine::control::ControlMessage,
    error::{Error, Result},
    graph::{
        node::{EffectNode, RenderCtx},
        stage::{Stage, StageKind},
    },
};

/// Loudness of one processed block, before and after the chain.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeterReading {
    pub input_rms: f32,
    pub output_rms: f32,
}

/// Snapshot of one stage for status displays.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageStatus {
    pub index: usize,
    pub kind: StageKind,
    pub bypassed: bool,
    /// The stage cannot affect the signal (convolution without a response).
    pub inert: bool,
    /// Current parameters, `None` for custom nodes.
    pub config: Option<StageConfig>,
}

struct Slot {
    stage: Stage,
    bypassed: bool,
}

/// Ordered chain of stages processed in place on a stereo block.
pub struct EffectPipeline {
    slots: Vec<Slot>,
    ctx: RenderCtx,
    meter: LevelMeter,
    metering: bool,
}

impl EffectPipeline {
    /// An empty pipeline: passes audio straight through.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            slots: Vec::new(),
            ctx: RenderCtx::new(sample_rate),
            meter: LevelMeter::new(),
            metering: false,
        }
    }

    /// Validate `config` and build every stage of its chain.
    ///
    /// A convolution stage with no usable impulse response starts bypassed.
    pub fn from_config(config: &EngineConfig, impulse: Option<&ImpulseResponse>) -> Result<Self> {
        config.validate()?;

        let mut pipeline = Self::new(config.sample_rate);
        pipeline.metering = config.metering;
        for stage_config in &config.chain {
            pipeline.push(Stage::from_config(stage_config, config, impulse));
        }

        tracing::info!(
            sample_rate = config.sample_rate,
            block_size = config.block_size,
            stages = pipeline.len(),
            "pipeline built"
        );
        Ok(pipeline)
    }

    /// Append a stage. Inert stages (convolution without a response) start bypassed.
    pub fn push(&mut self, stage: Stage) {
        let bypassed = stage.is_inert();
        if bypassed {
            tracing::debug!(index = self.slots.len(), kind = %stage.kind(), "stage starts bypassed");
        }
        self.slots.push(Slot { stage, bypassed });
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.ctx.sample_rate
    }

    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.slots.get(index).map(|slot| &slot.stage)
    }

    /// Kind and bypass flag of every stage, in processing order.
    pub fn stages(&self) -> impl Iterator<Item = (StageKind, bool)> + '_ {
        self.slots.iter().map(|slot| (slot.stage.kind(), slot.bypassed))
    }

    /// Type, bypass state and parameters of every stage, in processing order.
    pub fn status(&self) -> impl Iterator<Item = StageStatus> + '_ {
        self.slots.iter().enumerate().map(|(index, slot)| StageStatus {
            index,
            kind: slot.stage.kind(),
            bypassed: slot.bypassed,
            inert: slot.stage.is_inert(),
            config: slot.stage.config(),
        })
    }

    pub fn is_bypassed(&self, index: usize) -> Option<bool> {
        self.slots.get(index).map(|slot| slot.bypassed)
    }

    /// Set a stage's bypass flag, returning the resulting state.
    ///
    /// Inert stages stay bypassed.
    pub fn set_bypass(&mut self, index: usize, bypassed: bool) -> Result<bool> {
        let slot = self.slots.get_mut(index).ok_or(Error::NoSuchStage(index))?;
        slot.bypassed = bypassed || slot.stage.is_inert();
        Ok(slot.bypassed)
    }

    /// Flip a stage's bypass flag, returning the new state.
    pub fn toggle_bypass(&mut self, index: usize) -> Result<bool> {
        let bypassed = !self.is_bypassed(index).ok_or(Error::NoSuchStage(index))?;
        self.set_bypass(index, bypassed)
    }

    /// Apply a parameter snapshot to one stage.
    ///
    /// Returns `Ok(false)` when the snapshot is for a different kind of stage.
    pub fn set_params(&mut self, index: usize, params: StageConfig) -> Result<bool> {
        let slot = self.slots.get_mut(index).ok_or(Error::NoSuchStage(index))?;
        Ok(slot.stage.apply(params))
    }

    pub fn metering(&self) -> bool {
        self.metering
    }

    pub fn set_metering(&mut self, metering: bool) {
        self.metering = metering;
    }

    /// Apply a control message. Messages naming a missing stage are ignored.
    pub fn handle(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SetParams { stage, params } => {
                let _ = self.set_params(stage, params);
            }
            ControlMessage::SetBypass { stage, bypassed } => {
                let _ = self.set_bypass(stage, bypassed);
            }
            ControlMessage::ToggleBypass { stage } => {
                let _ = self.toggle_bypass(stage);
            }
            ControlMessage::SetMetering(metering) => self.metering = metering,
            ControlMessage::Reset => self.reset(),
        }
    }

    /// Run the chain over one stereo block in place.
    ///
    /// Returns a reading when metering is enabled.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) -> Option<MeterReading> {
        debug_assert_eq!(left.len(), right.len());
        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);

        let input_rms = self.metering.then(|| self.meter.measure_stereo(left, right));

        for slot in self.slots.iter_mut().filter(|slot| !slot.bypassed) {
            slot.stage.render_block(left, right, &self.ctx);
        }

        input_rms.map(|input_rms| MeterReading {
            input_rms,
            output_rms: self.meter.measure_stereo(left, right),
        })
    }

    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.stage.reset();
        }
    }
}
