/// Context passed to effect nodes during rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCtx {
    pub sample_rate: f32,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self { sample_rate }
    }
}

impl Default for RenderCtx {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SAMPLE_RATE)
    }
}

/// Core trait for stereo block processors.
///
/// `render_block` transforms both channels in place. The two slices always
/// have the same length. Implementations must not allocate, lock or log:
/// this runs on the audio thread.
pub trait EffectNode: Send {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx);

    /// Return to the just-constructed state (silent buffers, LFO at zero).
    ///
    /// Default implementation does nothing (stateless nodes).
    fn reset(&mut self) {}

    /// Latest level measured by this node, for metering nodes.
    fn level(&self) -> Option<f32> {
        None
    }
}

/// Allow boxed nodes to be used as nodes (for dynamic dispatch)
impl EffectNode for Box<dyn EffectNode> {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], ctx: &RenderCtx) {
        (**self).render_block(left, right, ctx)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn level(&self) -> Option<f32> {
        (**self).level()
    }
}
