use crate::{
    config::PhaserParams,
    dsp::{frame::Frame, phaser::PhaserChain},
    graph::node::{EffectNode, RenderCtx},
};

/// Phaser stage driving a [`PhaserChain`] from a parameter snapshot.
pub struct PhaserNode {
    chain: PhaserChain,
    params: PhaserParams,
}

impl PhaserNode {
    pub fn new(params: PhaserParams) -> Self {
        Self {
            chain: PhaserChain::new(params.stages()),
            params,
        }
    }

    pub fn params(&self) -> PhaserParams {
        self.params
    }

    /// Swap in new parameters. The LFO phase carries over so the sweep does not jump.
    pub fn set_params(&mut self, params: PhaserParams) {
        self.chain.set_stages(params.stages());
        self.params = params;
    }

    pub fn chain(&self) -> &PhaserChain {
        &self.chain
    }
}

impl EffectNode for PhaserNode {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        let PhaserNode { chain, params } = self;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let out = chain.process(
                Frame::new(*l, *r),
                params.rate(),
                params.depth(),
                params.feedback(),
                params.mix(),
            );
            *l = out.left;
            *r = out.right;
        }
    }

    fn reset(&mut self) {
        self.chain.reset();
    }
}
