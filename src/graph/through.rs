use crate::graph::node::{EffectNode, RenderCtx};

/*
Serial Signal Chain (Through)
=============================

Through connects two effect nodes in series: the block is processed by the
first node in place, then handed to the second.

  input:        [0.5, 0.8, -0.3, 0.9, ...]
  first (delay) [0.25, 0.4, -0.15, 0.45 + echo, ...]
  second (pan)  [scaled per channel]

This is how a custom chain is assembled outside the pipeline:

    let chain = DelayNode::new(params, 2000.0, 44_100.0)
        .through(PhaserNode::new(phaser))
        .through(PanNode::new(PanParams::default()));

The result is itself an EffectNode, so it can be boxed and slotted into a
pipeline as a single custom stage with one bypass flag.

Signal Flow:
------------
  [First] ──→ [Second] ──→ output

Order matters: a phaser after a delay sweeps the echoes too, a phaser before
it leaves each repeat with the sweep position it had when it was written.
*/

pub struct Through<A, B> {
    first: A,
    second: B,
}

impl<A, B> Through<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: EffectNode, B: EffectNode> EffectNode for Through<A, B> {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        self.first.render_block(left, right, ctx);
        self.second.render_block(left, right, ctx);
    }

    fn reset(&mut self) {
        self.first.reset();
        self.second.reset();
    }

    fn level(&self) -> Option<f32> {
        self.second.level().or_else(|| self.first.level())
    }
}
