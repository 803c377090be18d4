//! Stereo feedback delay on a fixed-capacity ring buffer.

/*
Feedback Delay
==============

    input ──┬────────────────────────────────────(× 1-mix)──┐
            │                                                (+)──→ output
            └─(× 1-fb)─(+)──→ [ write ]    [ read ] ──┬─(× mix)─┘
                        ↑                              │
                        └──────── (× fb) ←─────────────┘

Per frame:

    delayed = buffer[(cursor - offset) mod capacity]
    output  = input × (1 - mix) + delayed × mix
    buffer[cursor] = input × (1 - feedback) + delayed × feedback
    cursor = (cursor + 1) mod capacity

A unit impulse therefore produces echoes of (1 - feedback), then each
later echo is `feedback` times the previous one, spaced `offset` frames
apart and heard through `mix`. With feedback 0 the line is a pure delay:
the wet path replays the input exactly `offset` frames later.

Offset Policy
-------------

The offset is clamped, never wrapped: a request longer than the buffer
plays at the longest delay the buffer can hold instead of aliasing to a
short, wrong delay. The lower bound is one frame, because the loop reads
before it writes and a zero-frame loop would read the slot it is about to
overwrite (which holds the oldest sample, i.e. the longest delay).

Stability
---------

Every write is a convex blend of the input and the delayed sample, so the
buffer never holds more than the input peak. Feedback is still clamped to
[0, MAX_FEEDBACK] so the tail always decays.
*/

use crate::dsp::{
    frame::Frame,
    mix::{blend_dry_wet, clamp_param},
};

/// Largest accepted feedback amount.
pub const MAX_FEEDBACK: f32 = 0.99;

pub struct RingDelayLine {
    left: Vec<f32>,
    right: Vec<f32>,
    write_pos: usize,
    sample_rate: f32,
}

impl RingDelayLine {
    /// Allocate a delay line holding `capacity` frames per channel.
    ///
    /// A capacity below two is raised to two so that a one-frame delay exists.
    pub fn new(capacity: usize, sample_rate: f32) -> Self {
        let capacity = capacity.max(2);
        Self {
            left: vec![0.0; capacity],
            right: vec![0.0; capacity],
            write_pos: 0,
            sample_rate,
        }
    }

    /// Allocate enough room for `max_delay_ms` at `sample_rate`.
    pub fn with_max_delay(max_delay_ms: f32, sample_rate: f32) -> Self {
        let frames = (max_delay_ms.max(0.0) * sample_rate / 1000.0).ceil() as usize;
        // One extra slot: the longest usable offset is capacity - 1.
        Self::new(frames + 1, sample_rate)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.left.len()
    }

    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Offset in frames for a delay time, clamped into `[1, capacity - 1]`.
    #[inline]
    pub fn offset_samples(&self, delay_ms: f32) -> usize {
        let frames = (delay_ms.max(0.0) * self.sample_rate / 1000.0).round();
        (frames as usize).clamp(1, self.capacity() - 1)
    }

    /// Process one frame.
    #[inline]
    pub fn process(&mut self, input: Frame, delay_ms: f32, feedback: f32, mix: f32) -> Frame {
        let offset = self.offset_samples(delay_ms);
        self.process_offset(input, offset, feedback, mix)
    }

    /// Process one frame with a precomputed offset (see [`offset_samples`](Self::offset_samples)).
    #[inline]
    pub fn process_offset(&mut self, input: Frame, offset: usize, feedback: f32, mix: f32) -> Frame {
        let capacity = self.capacity();
        let offset = offset.clamp(1, capacity - 1);
        let feedback = clamp_param(feedback, 0.0, MAX_FEEDBACK);
        let mix = clamp_param(mix, 0.0, 1.0);

        let read_pos = (self.write_pos + capacity - offset) % capacity;
        let delayed = Frame::new(self.left[read_pos], self.right[read_pos]);

        self.left[self.write_pos] = blend_dry_wet(input.left, delayed.left, feedback);
        self.right[self.write_pos] = blend_dry_wet(input.right, delayed.right, feedback);

        self.write_pos = (self.write_pos + 1) % capacity;

        Frame::new(
            blend_dry_wet(input.left, delayed.left, mix),
            blend_dry_wet(input.right, delayed.right, mix),
        )
    }

    pub fn reset(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
        self.write_pos = 0;
    }
}
