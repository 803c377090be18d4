//! The tagged stage variant held by the pipeline.
//!
//! The built-in effects are enum variants so the pipeline dispatches them
//! with a `match` instead of a vtable call; anything else can ride along as
//! [`Stage::Custom`] through the shared [`EffectNode`] trait.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::{EngineConfig, StageConfig},
    dsp::convolution::ImpulseResponse,
    graph::{
        convolution::ConvolutionNode,
        delay::DelayNode,
        meter::MeterNode,
        node::{EffectNode, RenderCtx},
        pan::PanNode,
        phaser::PhaserNode,
    },
};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Delay,
    Phaser,
    Convolution,
    Pan,
    Meter,
    Custom,
}

impl StageKind {
    pub fn name(self) -> &'static str {
        match self {
            StageKind::Delay => "delay",
            StageKind::Phaser => "phaser",
            StageKind::Convolution => "convolution",
            StageKind::Pan => "pan",
            StageKind::Meter => "meter",
            StageKind::Custom => "custom",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub enum Stage {
    Delay(DelayNode),
    Phaser(PhaserNode),
    Convolution(ConvolutionNode),
    Pan(PanNode),
    Meter(MeterNode),
    Custom(Box<dyn EffectNode>),
}

impl Stage {
    /// Build the node for one chain entry.
    ///
    /// A convolution stage without a usable impulse response is built
    /// bypassed and a warning is logged; the rest of the chain is unaffected.
    pub fn from_config(
        stage: &StageConfig,
        config: &EngineConfig,
        impulse: Option<&ImpulseResponse>,
    ) -> Self {
        match *stage {
            StageConfig::Delay(params) => {
                Stage::Delay(DelayNode::new(params, config.max_delay_ms, config.sample_rate))
            }
            StageConfig::Phaser(params) => Stage::Phaser(PhaserNode::new(params)),
            StageConfig::Convolution(params) => {
                let mut node = ConvolutionNode::new(params, config.scratch_frames());
                match impulse {
                    Some(impulse) => {
                        if let Err(err) = node.configure(impulse) {
                            tracing::warn!(%err, "convolution stage bypassed");
                        }
                    }
                    None => tracing::warn!("no impulse response loaded, convolution stage bypassed"),
                }
                Stage::Convolution(node)
            }
            StageConfig::Pan(params) => Stage::Pan(PanNode::new(params)),
            StageConfig::Meter => Stage::Meter(MeterNode::new()),
        }
    }

    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Delay(_) => StageKind::Delay,
            Stage::Phaser(_) => StageKind::Phaser,
            Stage::Convolution(_) => StageKind::Convolution,
            Stage::Pan(_) => StageKind::Pan,
            Stage::Meter(_) => StageKind::Meter,
            Stage::Custom(_) => StageKind::Custom,
        }
    }

    /// Whether the stage can currently have no effect on the signal
    /// regardless of its bypass flag (a convolution with no response).
    pub fn is_inert(&self) -> bool {
        matches!(self, Stage::Convolution(node) if node.is_bypassed())
    }

    /// Current parameter snapshot. `None` for custom nodes.
    pub fn config(&self) -> Option<StageConfig> {
        match self {
            Stage::Delay(node) => Some(StageConfig::Delay(node.params())),
            Stage::Phaser(node) => Some(StageConfig::Phaser(node.params())),
            Stage::Convolution(node) => Some(StageConfig::Convolution(node.params())),
            Stage::Pan(node) => Some(StageConfig::Pan(node.params())),
            Stage::Meter(_) => Some(StageConfig::Meter),
            Stage::Custom(_) => None,
        }
    }

    /// Apply a parameter snapshot. Returns `false` if the snapshot is for a
    /// different kind of stage.
    pub fn apply(&mut self, params: StageConfig) -> bool {
        match (self, params) {
            (Stage::Delay(node), StageConfig::Delay(p)) => node.set_params(p),
            (Stage::Phaser(node), StageConfig::Phaser(p)) => node.set_params(p),
            (Stage::Convolution(node), StageConfig::Convolution(p)) => node.set_params(p),
            (Stage::Pan(node), StageConfig::Pan(p)) => node.set_params(p),
            _ => return false,
        }
        true
    }
}

impl EffectNode for Stage {
    #[inline]
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        match self {
            Stage::Delay(node) => node.render_block(left, right, ctx),
            Stage::Phaser(node) => node.render_block(left, right, ctx),
            Stage::Convolution(node) => node.render_block(left, right, ctx),
            Stage::Pan(node) => node.render_block(left, right, ctx),
            Stage::Meter(node) => node.render_block(left, right, ctx),
            Stage::Custom(node) => node.render_block(left, right, ctx),
        }
    }

    fn reset(&mut self) {
        match self {
            Stage::Delay(node) => node.reset(),
            Stage::Phaser(node) => node.reset(),
            Stage::Convolution(node) => node.reset(),
            Stage::Pan(node) => node.reset(),
            Stage::Meter(node) => node.reset(),
            Stage::Custom(node) => node.reset(),
        }
    }

    fn level(&self) -> Option<f32> {
        match self {
            Stage::Meter(node) => node.level(),
            Stage::Custom(node) => node.level(),
            _ => None,
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Stage").field(&self.kind()).finish()
    }
}
