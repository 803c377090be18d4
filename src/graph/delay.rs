use crate::{
    config::DelayParams,
    dsp::{delay::RingDelayLine, frame::Frame},
    graph::node::{EffectNode, RenderCtx},
};

/// Feedback delay stage.
///
/// The ring buffer is sized once for `max_delay_ms`; parameter snapshots can
/// move the delay time anywhere inside that capacity without reallocating.
pub struct DelayNode {
    line: RingDelayLine,
    params: DelayParams,
}

impl DelayNode {
    pub fn new(params: DelayParams, max_delay_ms: f32, sample_rate: f32) -> Self {
        Self {
            line: RingDelayLine::with_max_delay(max_delay_ms, sample_rate),
            params,
        }
    }

    pub fn params(&self) -> DelayParams {
        self.params
    }

    pub fn set_params(&mut self, params: DelayParams) {
        self.params = params;
    }

    pub fn line(&self) -> &RingDelayLine {
        &self.line
    }
}

impl EffectNode for DelayNode {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        let offset = self.line.offset_samples(self.params.time_ms());
        let feedback = self.params.feedback();
        let mix = self.params.mix();

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let out = self
                .line
                .process_offset(Frame::new(*l, *r), offset, feedback, mix);
            *l = out.left;
            *r = out.right;
        }
    }

    fn reset(&mut self) {
        self.line.reset();
    }
}
