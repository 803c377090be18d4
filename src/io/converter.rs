use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Device sample types the callback can read and write.
///
/// Processing always happens in `f32`; integer formats are converted at
/// the edges of the callback.
pub trait AudioSample: Copy + Send + 'static {
    /// The value of silence.
    const EQUILIBRIUM: Self;

    fn to_f32(self) -> f32;

    /// Convert back, saturating at full scale for integer formats.
    fn from_f32(value: f32) -> Self;
}

impl AudioSample for f32 {
    const EQUILIBRIUM: Self = 0.0;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        value
    }
}

impl AudioSample for i16 {
    const EQUILIBRIUM: Self = 0;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32 / 32_768.0
    }

    #[inline]
    fn from_f32(value: f32) -> Self {
        if value.is_nan() {
            return 0;
        }
        (value.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    #[default]
    F32,
    I16,
}

impl SampleFormat {
    pub fn name(self) -> &'static str {
        match self {
            SampleFormat::F32 => "f32",
            SampleFormat::I16 => "i16",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f32" | "float" => Ok(SampleFormat::F32),
            "i16" | "int16" => Ok(SampleFormat::I16),
            other => Err(format!("unknown sample format '{other}' (expected f32 or i16)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i16_scaling() {
        assert_eq!(i16::from_f32(0.0), 0);
        assert_eq!(i16::from_f32(1.0), i16::MAX);
        assert_eq!(i16::from_f32(-1.0), -i16::MAX);
        assert_eq!(i16::from_f32(0.5), 16_384);
        assert_eq!(i16::MIN.to_f32(), -1.0);
        assert_eq!(16_384i16.to_f32(), 0.5);
    }

    #[test]
    fn test_i16_saturates() {
        assert_eq!(i16::from_f32(4.0), i16::MAX);
        assert_eq!(i16::from_f32(-4.0), -i16::MAX);
        assert_eq!(i16::from_f32(f32::NAN), 0);
    }

    #[test]
    fn test_f32_passthrough() {
        assert_eq!(f32::from_f32(0.25).to_f32(), 0.25);
        assert_eq!(f32::EQUILIBRIUM, 0.0);
    }

    #[test]
    fn test_parse_sample_format() {
        assert_eq!("f32".parse::<SampleFormat>().unwrap(), SampleFormat::F32);
        assert_eq!("I16".parse::<SampleFormat>().unwrap(), SampleFormat::I16);
        assert!("u8".parse::<SampleFormat>().is_err());
        assert_eq!(SampleFormat::I16.to_string(), "i16");
    }
}
