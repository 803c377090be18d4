//! Block loudness estimates.
//!
//! [`LevelMeter`] is stateless: one block in, one RMS value out. Smoothing
//! successive readings for display is the job of [`RmsHistory`], which lives
//! on the control side and keeps a fixed window of recent values.

/// Default number of readings averaged by [`RmsHistory`].
pub const DEFAULT_RMS_WINDOW: usize = 50;
/// Largest window [`RmsHistory`] will hold.
pub const MAX_RMS_WINDOW: usize = 256;

/// Root-mean-square of a block; `0.0` for an empty block.
#[inline]
pub fn rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    (sum_of_squares(block) / block.len() as f64).sqrt() as f32
}

#[inline]
fn sum_of_squares(block: &[f32]) -> f64 {
    block.iter().map(|&s| (s as f64) * (s as f64)).sum()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LevelMeter;

impl LevelMeter {
    pub fn new() -> Self {
        Self
    }

    /// RMS of a mono block.
    #[inline]
    pub fn measure(&self, block: &[f32]) -> f32 {
        rms(block)
    }

    /// RMS over both channels of a stereo block.
    #[inline]
    pub fn measure_stereo(&self, left: &[f32], right: &[f32]) -> f32 {
        let count = left.len() + right.len();
        if count == 0 {
            return 0.0;
        }
        ((sum_of_squares(left) + sum_of_squares(right)) / count as f64).sqrt() as f32
    }
}

/// Moving average over the last `window` readings.
///
/// Backed by a fixed array, so pushing never allocates.
#[derive(Debug, Clone)]
pub struct RmsHistory {
    values: [f32; MAX_RMS_WINDOW],
    window: usize,
    len: usize,
    next: usize,
    sum: f64,
}

impl RmsHistory {
    /// Create a history averaging up to `window` readings (clamped to `1..=MAX_RMS_WINDOW`).
    pub fn new(window: usize) -> Self {
        Self {
            values: [0.0; MAX_RMS_WINDOW],
            window: window.clamp(1, MAX_RMS_WINDOW),
            len: 0,
            next: 0,
            sum: 0.0,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Record a reading and return the updated average.
    pub fn push(&mut self, value: f32) -> f32 {
        let value = if value.is_finite() { value } else { 0.0 };
        if self.len == self.window {
            self.sum -= self.values[self.next] as f64;
        } else {
            self.len += 1;
        }
        self.values[self.next] = value;
        self.sum += value as f64;
        self.next = (self.next + 1) % self.window;
        self.average()
    }

    /// Average of the readings held so far (`0.0` when empty).
    pub fn average(&self) -> f32 {
        if self.len == 0 {
            0.0
        } else {
            (self.sum / self.len as f64) as f32
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.next = 0;
        self.sum = 0.0;
    }
}

impl Default for RmsHistory {
    fn default() -> Self {
        Self::new(DEFAULT_RMS_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_1_SQRT_2, TAU};

    #[test]
    fn test_rms_of_constant() {
        assert!((rms(&[0.5; 64]) - 0.5).abs() < 1e-6);
        assert!((rms(&[-0.5; 64]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_empty_block_is_zero() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(LevelMeter::new().measure_stereo(&[], &[]), 0.0);
    }

    #[test]
    fn test_sine_rms_converges() {
        let amplitude = 0.8;
        let mut previous_error = f32::MAX;
        for &len in &[100usize, 1_000, 10_000, 100_000] {
            // Irrational-ish frequency so blocks never hold whole cycles.
            let block: Vec<f32> = (0..len)
                .map(|i| amplitude * (TAU * 0.0123 * i as f32).sin())
                .collect();
            let error = (rms(&block) - amplitude * FRAC_1_SQRT_2).abs();
            assert!(error <= previous_error + 1e-4, "len {len}: error {error}");
            previous_error = error;
        }
        assert!(previous_error < 1e-3);
    }

    #[test]
    fn test_stereo_measure_averages_channels() {
        let meter = LevelMeter::new();
        let left = [1.0; 32];
        let right = [0.0; 32];
        let expected = (0.5f32).sqrt();
        assert!((meter.measure_stereo(&left, &right) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_history_moving_average() {
        let mut history = RmsHistory::new(3);
        assert_eq!(history.push(3.0), 3.0);
        assert_eq!(history.push(6.0), 4.5);
        assert_eq!(history.push(9.0), 6.0);
        // Window full: the oldest reading (3.0) drops out.
        assert_eq!(history.push(12.0), 9.0);
    }

    #[test]
    fn test_history_ignores_non_finite() {
        let mut history = RmsHistory::new(2);
        history.push(1.0);
        assert_eq!(history.push(f32::NAN), 0.5);
    }

    #[test]
    fn test_history_clear() {
        let mut history = RmsHistory::default();
        assert_eq!(history.window(), DEFAULT_RMS_WINDOW);
        history.push(1.0);
        history.clear();
        assert_eq!(history.average(), 0.0);
    }
}
