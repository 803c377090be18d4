use crate::{
    dsp::meter::LevelMeter,
    graph::node::{EffectNode, RenderCtx},
};

/// Tap point measuring the signal at its position in the chain.
///
/// Leaves the audio untouched.
#[derive(Debug, Default)]
pub struct MeterNode {
    meter: LevelMeter,
    last: f32,
}

impl MeterNode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectNode for MeterNode {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        self.last = self.meter.measure_stereo(left, right);
    }

    fn reset(&mut self) {
        self.last = 0.0;
    }

    fn level(&self) -> Option<f32> {
        Some(self.last)
    }
}
