//! Phaser - LFO-swept cascade of first-order all-pass stages.
//!
//! Each stage keeps a single memory per channel and runs
//!
//! ```text
//! w[n] = x[n] + m · w[n-1]
//! y[n] = w[n-1] - m · w[n]
//! ```
//!
//! which is the all-pass `(z⁻¹ - m) / (1 - m·z⁻¹)`: unit magnitude at every
//! frequency, phase rotating with `m`. Sweeping `m` with an LFO moves the
//! notches that appear once the wet path is blended with the dry input.
//!
//! # Feedback
//!
//! The last stage's memory from the previous frame, scaled by `feedback`, is
//! added to the cascade input. That memory is the state `w`, whose gain peaks
//! at `1 / (1 - |m|)`, so the loop stays stable while
//! `feedback + |depth| < 1`. Both values are clamped so their sum never
//! exceeds [`MAX_LOOP_GAIN`].
//!
//! # Depth
//!
//! `|m|` must stay strictly below 1 or the recursion stops decaying; depth is
//! clamped to [`MAX_MOD_DEPTH`]. A depth of exactly zero bypasses the
//! cascade so the wet path is bit-identical to the dry input.

use crate::dsp::{
    frame::Frame,
    lfo::LfoPhase,
    mix::{blend_dry_wet, clamp_param},
};

/// Maximum number of all-pass stages per channel.
pub const MAX_STAGES: usize = 12;
/// Largest modulation depth magnitude.
pub const MAX_MOD_DEPTH: f32 = 0.9;
/// Largest feedback amount.
pub const MAX_PHASER_FEEDBACK: f32 = 0.9;
/// Upper bound on `feedback + |depth|`.
pub const MAX_LOOP_GAIN: f32 = 0.99;
/// Highest LFO rate in cycles per sample (Nyquist).
pub const MAX_RATE: f64 = 0.5;

pub struct PhaserChain {
    left: [f32; MAX_STAGES],
    right: [f32; MAX_STAGES],
    stages: usize,
    lfo: LfoPhase,
}

impl PhaserChain {
    /// Create a chain with `stages` all-pass sections, clamped to `1..=MAX_STAGES`.
    pub fn new(stages: usize) -> Self {
        Self {
            left: [0.0; MAX_STAGES],
            right: [0.0; MAX_STAGES],
            stages: stages.clamp(1, MAX_STAGES),
            lfo: LfoPhase::new(),
        }
    }

    pub fn stages(&self) -> usize {
        self.stages
    }

    /// Change the stage count (RT-safe, no allocation).
    ///
    /// Newly enabled stages start from rest.
    pub fn set_stages(&mut self, stages: usize) {
        let stages = stages.clamp(1, MAX_STAGES);
        if stages > self.stages {
            self.left[self.stages..stages].fill(0.0);
            self.right[self.stages..stages].fill(0.0);
        }
        self.stages = stages;
    }

    /// LFO phase in cycles, `[0, 1)`.
    pub fn lfo_phase(&self) -> f64 {
        self.lfo.phase()
    }

    /// Process one frame.
    ///
    /// `rate` is in cycles per sample.
    #[inline]
    pub fn process(&mut self, input: Frame, rate: f64, depth: f32, feedback: f32, mix: f32) -> Frame {
        let depth = clamp_param(depth, -MAX_MOD_DEPTH, MAX_MOD_DEPTH);
        let feedback = clamp_param(feedback, 0.0, max_feedback(depth));
        let mix = clamp_param(mix, 0.0, 1.0);

        let lfo = self.lfo.raised_cosine();
        self.lfo.advance(clamp_rate(rate));

        if depth == 0.0 {
            self.clear_stages();
            return input;
        }

        let mod_depth = lfo * depth;
        let stages = self.stages;

        let wet_l = run_cascade(&mut self.left[..stages], input.left, mod_depth, feedback);
        let wet_r = run_cascade(&mut self.right[..stages], input.right, mod_depth, feedback);

        Frame::new(
            blend_dry_wet(input.left, wet_l, mix),
            blend_dry_wet(input.right, wet_r, mix),
        )
    }

    fn clear_stages(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    pub fn reset(&mut self) {
        self.clear_stages();
        self.lfo.reset();
    }
}

/// Largest feedback that keeps `feedback + |depth|` within [`MAX_LOOP_GAIN`].
#[inline]
pub fn max_feedback(depth: f32) -> f32 {
    (MAX_LOOP_GAIN - depth.abs()).clamp(0.0, MAX_PHASER_FEEDBACK)
}

/// NaN and negative rates hold the LFO, anything above Nyquist is capped.
#[inline]
fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, MAX_RATE)
    }
}

#[inline]
fn run_cascade(memory: &mut [f32], input: f32, mod_depth: f32, feedback: f32) -> f32 {
    let last = memory.last().copied().unwrap_or(0.0);
    let mut signal = input + last * feedback;
    for state in memory.iter_mut() {
        let old = *state;
        *state = signal + old * mod_depth;
        signal = old - *state * mod_depth;
    }
    signal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(i: usize, freq: f32) -> f32 {
        (std::f32::consts::TAU * freq * i as f32).sin()
    }

    #[test]
    fn test_zero_depth_is_identity() {
        for stages in 1..=MAX_STAGES {
            let mut chain = PhaserChain::new(stages);
            for i in 0..512 {
                let input = Frame::new(sine(i, 0.013), sine(i, 0.031) * 0.5);
                let out = chain.process(input, 0.001, 0.0, 0.9, 1.0);
                assert_eq!(out, input, "stage count {stages}, frame {i}");
            }
        }
    }

    #[test]
    fn test_zero_mix_is_dry() {
        let mut chain = PhaserChain::new(6);
        for i in 0..256 {
            let input = Frame::mono(sine(i, 0.02));
            assert_eq!(chain.process(input, 0.001, 0.6, 0.3, 0.0), input);
        }
    }

    #[test]
    fn test_single_stage_recursion() {
        // With the LFO pinned at its peak (rate 0), m = depth.
        let mut chain = PhaserChain::new(1);
        let m = 0.5;
        let y0 = chain.process(Frame::mono(1.0), 0.0, m, 0.0, 1.0).left;
        // w0 = 1, y0 = 0 - 1·m
        assert!((y0 + 0.5).abs() < 1e-6);
        let y1 = chain.process(Frame::SILENCE, 0.0, m, 0.0, 1.0).left;
        // w1 = 0 + 1·m = 0.5, y1 = 1 - 0.5·0.5
        assert!((y1 - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_allpass_preserves_energy() {
        let mut chain = PhaserChain::new(4);
        let mut energy_in = 0.0;
        let mut energy_out = 0.0;
        for i in 0..4096 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let y = chain.process(Frame::mono(x), 0.0, 0.6, 0.0, 1.0).left;
            energy_in += x * x;
            energy_out += y * y;
        }
        assert!((energy_out - energy_in).abs() < 1e-3, "in {energy_in}, out {energy_out}");
    }

    #[test]
    fn test_lfo_advances_per_frame() {
        let mut chain = PhaserChain::new(2);
        for _ in 0..25 {
            chain.process(Frame::SILENCE, 0.01, 0.5, 0.0, 0.5);
        }
        assert!((chain.lfo_phase() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_settings_stay_bounded() {
        for &stages in &[1, 2, 6, MAX_STAGES] {
            for &depth in &[-10.0, -0.9, 0.5, 0.9, 10.0] {
                let mut chain = PhaserChain::new(stages);
                for i in 0..40_000 {
                    let x = if i % 2 == 0 { 1.0 } else { sine(i, 0.001) };
                    let out = chain.process(Frame::mono(x), 1e-3, depth, 5.0, 1.0);
                    assert!(out.left.is_finite());
                    assert!(out.left.abs() < 1_000.0, "diverged: stages {stages} depth {depth} -> {}", out.left);
                }
            }
        }
    }

    /// Straight transcription of the per-frame recursion, one channel.
    struct Reference {
        memory: Vec<f32>,
    }

    impl Reference {
        fn process(&mut self, x: f32, m: f32, feedback: f32, mix: f32) -> f32 {
            let last = self.memory[self.memory.len() - 1];
            let mut signal = x + last * feedback;
            for i in 0..self.memory.len() {
                let old = self.memory[i];
                self.memory[i] = signal + old * m;
                signal = old - self.memory[i] * m;
            }
            mix * signal + (1.0 - mix) * x
        }
    }

    #[test]
    fn test_feedback_matches_recursion() {
        for stages in [1, 3, 8] {
            let (depth, feedback, mix) = (0.5, 0.3, 0.8);
            let rate = 0.002;
            let mut chain = PhaserChain::new(stages);
            let mut reference = Reference {
                memory: vec![0.0; stages],
            };
            let mut phase = 0.0f64;
            for i in 0..2_000 {
                let x = if i == 0 { 1.0 } else { sine(i, 0.017) * 0.5 };
                let lfo = (1.0 + (std::f64::consts::TAU * phase).cos()) as f32 / 2.0;
                phase = (phase + rate).fract();

                let expected = reference.process(x, lfo * depth, feedback, mix);
                let out = chain.process(Frame::mono(x), rate, depth, feedback, mix).left;
                assert!((out - expected).abs() < 1e-4, "stages {stages}, frame {i}: {out} vs {expected}");
            }
        }
    }

    #[test]
    fn test_single_stage_feedback_impulse() {
        // m = 0.5 (LFO pinned at its peak), feedback 0.25.
        let mut chain = PhaserChain::new(1);
        let y0 = chain.process(Frame::mono(1.0), 0.0, 0.5, 0.25, 1.0).left;
        // w0 = 1, y0 = 0 - 0.5
        assert!((y0 + 0.5).abs() < 1e-6);
        let y1 = chain.process(Frame::SILENCE, 0.0, 0.5, 0.25, 1.0).left;
        // input = 0 + w0·0.25, w1 = 0.25 + 0.5 = 0.75, y1 = 1 - 0.375
        assert!((y1 - 0.625).abs() < 1e-6);
    }

    #[test]
    fn test_feedback_is_limited_by_depth() {
        assert!((max_feedback(0.5) - 0.49).abs() < 1e-6);
        assert_eq!(max_feedback(0.0), MAX_PHASER_FEEDBACK);
        assert_eq!(max_feedback(-MAX_MOD_DEPTH), MAX_LOOP_GAIN - MAX_MOD_DEPTH);

        // Over-limit feedback behaves as the limit itself.
        let mut clamped = PhaserChain::new(2);
        let mut limit = PhaserChain::new(2);
        for i in 0..500 {
            let input = Frame::mono(sine(i, 0.05));
            assert_eq!(
                clamped.process(input, 0.0, 0.8, 0.9, 1.0),
                limit.process(input, 0.0, 0.8, max_feedback(0.8), 1.0)
            );
        }
    }

    #[test]
    fn test_nan_rate_holds_lfo() {
        let mut chain = PhaserChain::new(2);
        for _ in 0..10 {
            chain.process(Frame::mono(0.2), f64::NAN, 0.5, 0.2, 0.5);
        }
        assert_eq!(chain.lfo_phase(), 0.0);
        chain.process(Frame::mono(0.2), 10.0, 0.5, 0.2, 0.5);
        assert!((chain.lfo_phase() - MAX_RATE).abs() < 1e-12);
    }

    #[test]
    fn test_set_stages_clamps() {
        let mut chain = PhaserChain::new(0);
        assert_eq!(chain.stages(), 1);
        chain.set_stages(64);
        assert_eq!(chain.stages(), MAX_STAGES);
        chain.set_stages(4);
        assert_eq!(chain.stages(), 4);
    }

    #[test]
    fn test_reset_clears_lfo() {
        let mut chain = PhaserChain::new(3);
        for _ in 0..10 {
            chain.process(Frame::mono(0.3), 0.01, 0.5, 0.5, 0.5);
        }
        chain.reset();
        assert_eq!(chain.lfo_phase(), 0.0);
    }
}
