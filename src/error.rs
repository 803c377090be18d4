//! Error type shared by configuration, impulse loading and pipeline setup.
//!
//! Nothing on the audio path returns these: every check happens before the
//! stream starts, so the callback itself is infallible.

use crate::dsp::phaser::MAX_STAGES;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A parameter was outside its accepted range (or NaN).
    #[error("parameter '{name}' = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Phaser stage count outside `1..=MAX_STAGES`.
    #[error("phaser stage count {0} is outside 1..={max}", max = MAX_STAGES)]
    InvalidStageCount(usize),

    /// Only mono and stereo inputs are supported.
    #[error("unsupported input channel count {0} (expected 1 or 2)")]
    UnsupportedChannels(u16),

    #[error("block size must be non-zero")]
    ZeroBlockSize,

    /// The impulse response holds no coefficients.
    #[error("impulse response is empty")]
    EmptyImpulseResponse,

    #[error("impulse response coefficient {0} is not finite")]
    NonFiniteImpulse(usize),

    /// Stage index used by a control message or bypass call does not exist.
    #[error("no stage at index {0}")]
    NoSuchStage(usize),

    /// WAV decoding failed while loading an impulse response.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check `value` against an inclusive range, rejecting NaN.
pub(crate) fn ensure_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(Error::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds_inclusive() {
        assert_eq!(ensure_range("mix", 0.0, 0.0, 1.0).unwrap(), 0.0);
        assert_eq!(ensure_range("mix", 1.0, 0.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn rejects_nan_and_out_of_range() {
        assert!(ensure_range("mix", f32::NAN, 0.0, 1.0).is_err());
        let err = ensure_range("feedback", 1.5, 0.0, 0.99).unwrap_err();
        assert!(err.to_string().contains("feedback"));
    }
}
