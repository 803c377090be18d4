use crate::{
    config::PanParams,
    dsp::mix::pan_gains,
    graph::node::{EffectNode, RenderCtx},
};

/// Constant-power stereo balance (see [`crate::dsp::mix`]).
pub struct PanNode {
    params: PanParams,
    gains: (f32, f32),
}

impl PanNode {
    pub fn new(params: PanParams) -> Self {
        Self {
            params,
            gains: pan_gains(params.balance()),
        }
    }

    pub fn params(&self) -> PanParams {
        self.params
    }

    pub fn set_params(&mut self, params: PanParams) {
        self.params = params;
        self.gains = pan_gains(params.balance());
    }

    /// Current (left, right) gains.
    pub fn gains(&self) -> (f32, f32) {
        self.gains
    }
}

impl EffectNode for PanNode {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        let (gain_l, gain_r) = self.gains;
        for sample in left.iter_mut() {
            *sample *= gain_l;
        }
        for sample in right.iter_mut() {
            *sample *= gain_r;
        }
    }
}
