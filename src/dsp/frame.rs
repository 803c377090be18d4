/// One stereo sample pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    pub const SILENCE: Frame = Frame {
        left: 0.0,
        right: 0.0,
    };

    #[inline]
    pub fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Duplicate a mono sample into both channels.
    #[inline]
    pub fn mono(sample: f32) -> Self {
        Self {
            left: sample,
            right: sample,
        }
    }

    #[inline]
    pub fn map(self, mut f: impl FnMut(f32) -> f32) -> Self {
        Self {
            left: f(self.left),
            right: f(self.right),
        }
    }
}

impl From<(f32, f32)> for Frame {
    fn from((left, right): (f32, f32)) -> Self {
        Self { left, right }
    }
}

impl From<Frame> for (f32, f32) {
    fn from(frame: Frame) -> Self {
        (frame.left, frame.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_duplicates_sample() {
        let frame = Frame::mono(0.25);
        assert_eq!(frame.left, 0.25);
        assert_eq!(frame.right, 0.25);
    }

    #[test]
    fn map_applies_to_both_channels() {
        let frame = Frame::new(1.0, -2.0).map(|s| s * 0.5);
        assert_eq!(frame, Frame::new(0.5, -1.0));
    }
}
