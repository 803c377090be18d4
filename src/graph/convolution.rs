use crate::{
    config::ConvolutionParams,
    dsp::convolution::{ConvolutionEngine, ImpulseResponse},
    error::Result,
    graph::node::{EffectNode, RenderCtx},
};

/// Stereo convolution stage: one engine per channel, both configured from
/// the same impulse response.
pub struct ConvolutionNode {
    left: ConvolutionEngine,
    right: ConvolutionEngine,
    params: ConvolutionParams,
}

impl ConvolutionNode {
    /// Create a bypassed node for blocks of up to `max_block` frames.
    pub fn new(params: ConvolutionParams, max_block: usize) -> Self {
        Self {
            left: ConvolutionEngine::new(max_block),
            right: ConvolutionEngine::new(max_block),
            params,
        }
    }

    /// Install an impulse response on both channels.
    ///
    /// On error both channels stay bypassed.
    pub fn configure(&mut self, impulse: &ImpulseResponse) -> Result<()> {
        if let Err(err) = self.left.configure(impulse) {
            self.right.clear();
            return Err(err);
        }
        self.right.configure(impulse)
    }

    pub fn is_bypassed(&self) -> bool {
        self.left.is_bypassed()
    }

    pub fn impulse_len(&self) -> usize {
        self.left.impulse_len()
    }

    pub fn params(&self) -> ConvolutionParams {
        self.params
    }

    pub fn set_params(&mut self, params: ConvolutionParams) {
        self.params = params;
    }
}

impl EffectNode for ConvolutionNode {
    fn render_block(&mut self, left: &mut [f32], right: &mut [f32], _ctx: &RenderCtx) {
        let mix = self.params.mix();
        self.left.process_mixed(left, mix);
        self.right.process_mixed(right, mix);
    }

    fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_unconfigured_node_passes_through() {
        let mut node = ConvolutionNode::new(ConvolutionParams::default(), 64);
        assert!(node.is_bypassed());
        let mut left = vec![0.25; 64];
        let mut right = vec![-0.25; 64];
        node.render_block(&mut left, &mut right, &RenderCtx::default());
        assert!(left.iter().all(|&s| s == 0.25));
        assert!(right.iter().all(|&s| s == -0.25));
    }

    #[test]
    fn test_channels_convolve_independently() {
        let mut node = ConvolutionNode::new(ConvolutionParams::default(), 16);
        node.configure(&ImpulseResponse::from(vec![0.0, 1.0])).unwrap();
        assert_eq!(node.impulse_len(), 2);

        let mut left = vec![0.0; 16];
        let mut right = vec![0.0; 16];
        left[0] = 1.0;
        right[3] = 0.5;
        node.render_block(&mut left, &mut right, &RenderCtx::default());

        assert!((left[1] - 1.0).abs() < 1e-5);
        assert!(left[0].abs() < 1e-5);
        assert!((right[4] - 0.5).abs() < 1e-5);
        assert!(right[1].abs() < 1e-5);
    }

    #[test]
    fn test_empty_impulse_keeps_bypass() {
        let mut node = ConvolutionNode::new(ConvolutionParams::default(), 16);
        let result = node.configure(&ImpulseResponse::default());
        assert!(matches!(result, Err(Error::EmptyImpulseResponse)));
        assert!(node.is_bypassed());
    }

    #[test]
    fn test_half_mix() {
        let mut node = ConvolutionNode::new(ConvolutionParams::new(0.5).unwrap(), 8);
        node.configure(&ImpulseResponse::from(vec![0.0, 0.0, 0.0, 1.0])).unwrap();
        let mut left = vec![0.0; 8];
        let mut right = vec![0.0; 8];
        left[0] = 1.0;
        node.render_block(&mut left, &mut right, &RenderCtx::default());
        assert!((left[0] - 0.5).abs() < 1e-5);
        assert!((left[3] - 0.5).abs() < 1e-5);
    }
}
