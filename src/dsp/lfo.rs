//! Low Frequency Oscillator (LFO) phase and shape helpers.

/*
Low Frequency Oscillators
=========================

An LFO is simply an oscillator running at sub-audio frequencies. Here it
only ever drives a parameter (the phaser's all-pass coefficient), never the
output directly.

Vocabulary
----------

  rate          Phase increment per frame, in cycles per sample.
                  rate = frequency_hz / sample_rate
                At 44.1 kHz a 0.5 Hz sweep is rate ≈ 1.13e-5.

  phase         Position within one cycle, kept in [0, 1).
                Wraps back to 0 when it reaches 1.

  period        Frames needed for one full cycle: 1 / rate.

  bipolar       Output swings -1.0 to +1.0.

  unipolar      Output stays in 0.0 to 1.0.
                  unipolar = (bipolar + 1.0) / 2.0


Raised Cosine
-------------

The phaser wants a unipolar sweep that starts at its widest point and
glides smoothly, so it uses a raised cosine:

    value = (1 + cos(2π × phase)) / 2

    phase   value
    0.00    1.0
    0.25    0.5
    0.50    0.0
    0.75    0.5

No corners, no jumps: the all-pass coefficient never steps abruptly.


Precision
---------

The phase is accumulated in f64. At very slow rates (1e-5 cycles/sample)
an f32 accumulator drifts audibly within minutes; f64 keeps the period
exact for hours of streaming.
*/

use std::f64::consts::TAU;

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
///
/// Useful when a parameter expects positive-only modulation.
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Convert an LFO frequency to a per-frame phase increment.
///
/// # Example
/// ```
/// use resobox::dsp::lfo::rate_from_hz;
/// let rate = rate_from_hz(441.0, 44_100.0);
/// assert!((rate - 0.01).abs() < 1e-9);
/// ```
#[inline]
pub fn rate_from_hz(frequency_hz: f32, sample_rate: f32) -> f64 {
    frequency_hz as f64 / sample_rate as f64
}

/// Frames per LFO cycle for a given rate (cycles per sample).
///
/// # Example
/// ```
/// use resobox::dsp::lfo::period_in_frames;
/// assert_eq!(period_in_frames(0.01), 100.0);
/// ```
#[inline]
pub fn period_in_frames(rate: f64) -> f64 {
    1.0 / rate
}

/// Phase accumulator in cycles, wrapping into `[0, 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LfoPhase {
    phase: f64,
}

impl LfoPhase {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    #[inline]
    pub fn phase(&self) -> f64 {
        self.phase
    }

    /// Current raised-cosine value in `[0, 1]`.
    #[inline]
    pub fn raised_cosine(&self) -> f32 {
        bipolar_to_unipolar((TAU * self.phase).cos() as f32)
    }

    /// Advance by `rate` cycles. Negative and NaN rates hold the phase.
    #[inline]
    pub fn advance(&mut self, rate: f64) {
        if rate > 0.0 {
            self.phase += rate;
            if self.phase >= 1.0 {
                self.phase -= self.phase.floor();
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
