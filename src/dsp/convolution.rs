//! Streaming convolution with a fixed impulse response.
//!
//! # Overlap-Add
//!
//! Convolving a block of `B` samples with an impulse response of `L` taps
//! yields `B + L - 1` samples. Only the first `B` belong to this block's
//! output; the remaining `L - 1` spill into the blocks that follow. The engine
//! keeps that spill (the *carry*) and sums it into later outputs, so streaming
//! block by block produces exactly the same signal as one long convolution.
//!
//! ```text
//! block 1: [ y0 y1 y2 y3 | t0 t1 t2 ]        t = tail, carried
//! block 2:               [ y4 y5 y6 y7 | ... ]
//!                          +t0 +t1 +t2
//! ```
//!
//! # Partitioning
//!
//! A single FFT sized for the whole impulse response would make every block
//! pay for the full response length. Instead the response is cut into `K`
//! partitions of `P` taps (`P` = block size rounded up to a power of two) and
//! each partition's spectrum `H_k` is computed once in
//! [`ConvolutionEngine::configure`].
//!
//! Time is divided into frames of `P` samples. Input is handled in chunks
//! that never cross a frame boundary, so a block larger than `P`, or one that
//! starts mid-frame, is split. Per chunk:
//!
//! 1. FFT the chunk once, zero-padded to `2P` at its position in the frame.
//! 2. `X·H_k` for `k >= 1` belongs `k` frames ahead; add it to that frame's
//!    pending spectrum.
//! 3. Add `X·H_0` to the current frame's pending spectrum, run one inverse
//!    FFT and add the result into the carry.
//! 4. Emit the chunk's carry samples and clear them.
//!
//! Every chunk costs one forward and one inverse FFT whatever `K` is. The
//! carry is a ring of `2P` samples starting at the current frame. Splitting
//! is exact because convolution is linear and time-invariant.
//!
//! # Bypass
//!
//! An engine without an impulse response passes its input through
//! unchanged. `configure` refuses an empty response and leaves the engine in
//! that bypass state rather than producing silence.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::{
    dsp::mix::{blend_dry_wet, clamp_param},
    error::{Error, Result},
};

/// Immutable impulse response coefficients.
///
/// Cloning shares the coefficients, so the left and right engines of a
/// stereo stage can hold the same response without copying it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseResponse {
    coefficients: Arc<[f32]>,
}

impl ImpulseResponse {
    pub fn new(coefficients: impl Into<Arc<[f32]>>) -> Self {
        Self {
            coefficients: coefficients.into(),
        }
    }

    /// The identity kernel `[1.0]`.
    pub fn unit() -> Self {
        Self::new(vec![1.0])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.coefficients
    }

    /// Check that the response can be convolved with.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptyImpulseResponse);
        }
        match self.coefficients.iter().position(|c| !c.is_finite()) {
            Some(index) => Err(Error::NonFiniteImpulse(index)),
            None => Ok(()),
        }
    }
}

impl Default for ImpulseResponse {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<f32>> for ImpulseResponse {
    fn from(coefficients: Vec<f32>) -> Self {
        Self::new(coefficients)
    }
}

impl From<&[f32]> for ImpulseResponse {
    fn from(coefficients: &[f32]) -> Self {
        Self::new(coefficients)
    }
}

/// Mono streaming convolver.
pub struct ConvolutionEngine {
    max_block: usize,
    kernel: Option<Kernel>,
}

impl ConvolutionEngine {
    /// Create an unconfigured (bypassed) engine tuned for blocks of up to `max_block` frames.
    pub fn new(max_block: usize) -> Self {
        Self {
            max_block: max_block.max(1),
            kernel: None,
        }
    }

    /// Install an impulse response, discarding any carried tail.
    ///
    /// Allocates; call before streaming starts, never from the audio callback.
    /// On error the engine is left bypassed.
    pub fn configure(&mut self, impulse: &ImpulseResponse) -> Result<()> {
        self.kernel = None;
        impulse.validate()?;

        let kernel = Kernel::new(impulse.as_slice(), self.max_block);
        tracing::debug!(
            taps = impulse.len(),
            partition = kernel.partition,
            partitions = kernel.partitions,
            "convolution kernel configured"
        );
        self.kernel = Some(kernel);
        Ok(())
    }

    /// Drop the impulse response and return to bypass.
    pub fn clear(&mut self) {
        self.kernel = None;
    }

    #[inline]
    pub fn is_bypassed(&self) -> bool {
        self.kernel.is_none()
    }

    /// Number of taps in the configured response (0 when bypassed).
    pub fn impulse_len(&self) -> usize {
        self.kernel.as_ref().map_or(0, |k| k.taps)
    }

    /// Length of the tail carried between blocks: taps - 1.
    pub fn carry_len(&self) -> usize {
        self.impulse_len().saturating_sub(1)
    }

    /// Convolve `block` in place, fully wet.
    pub fn process(&mut self, block: &mut [f32]) {
        self.process_mixed(block, 1.0);
    }

    /// Convolve `block` in place and blend with the dry input.
    pub fn process_mixed(&mut self, block: &mut [f32], mix: f32) {
        let Some(kernel) = self.kernel.as_mut() else {
            return;
        };
        let mix = clamp_param(mix, 0.0, 1.0);
        let mut pos = 0;
        while pos < block.len() {
            let n = kernel.room().min(block.len() - pos);
            kernel.process_chunk(&mut block[pos..pos + n], mix);
            pos += n;
        }
    }

    /// Clear the carried tail, keeping the impulse response.
    pub fn reset(&mut self) {
        if let Some(kernel) = self.kernel.as_mut() {
            kernel.reset();
        }
    }
}

struct Kernel {
    taps: usize,
    partition: usize,
    fft_len: usize,
    partitions: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    /// Partition spectra, `fft_len` bins each, laid out back to back.
    segments: Vec<Complex<f32>>,
    /// Spectra owed to the coming frames, one slot per partition.
    pending: Vec<Complex<f32>>,
    /// Slot of the current frame in `pending`.
    slot: usize,
    /// Samples of the current frame already processed.
    fill: usize,
    spectrum: Vec<Complex<f32>>,
    work: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Ring of `fft_len` output samples starting at the current frame.
    tail: Vec<f32>,
    start: usize,
    #[cfg(test)]
    inverse_runs: usize,
}

impl Kernel {
    fn new(coefficients: &[f32], max_block: usize) -> Self {
        let partition = max_block.next_power_of_two();
        let fft_len = partition * 2;

        let mut planner = FftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(fft_len);
        let inverse = planner.plan_fft_inverse(fft_len);

        let scratch_len = forward
            .get_inplace_scratch_len()
            .max(inverse.get_inplace_scratch_len());
        let mut scratch = vec![Complex::default(); scratch_len];

        let partitions = coefficients.len().div_ceil(partition).max(1);
        let mut segments = vec![Complex::default(); partitions * fft_len];
        for (taps, bins) in coefficients
            .chunks(partition)
            .zip(segments.chunks_mut(fft_len))
        {
            for (bin, &tap) in bins.iter_mut().zip(taps) {
                *bin = Complex::new(tap, 0.0);
            }
            forward.process_with_scratch(bins, &mut scratch);
        }

        Self {
            taps: coefficients.len(),
            partition,
            fft_len,
            partitions,
            forward,
            inverse,
            segments,
            pending: vec![Complex::default(); partitions * fft_len],
            slot: 0,
            fill: 0,
            spectrum: vec![Complex::default(); fft_len],
            work: vec![Complex::default(); fft_len],
            scratch,
            tail: vec![0.0; fft_len],
            start: 0,
            #[cfg(test)]
            inverse_runs: 0,
        }
    }

    /// Samples left before the current frame is complete.
    #[inline]
    fn room(&self) -> usize {
        self.partition - self.fill
    }

    /// Convolve a chunk that lies inside the current frame.
    fn process_chunk(&mut self, chunk: &mut [f32], mix: f32) {
        let len = chunk.len();
        let offset = self.fill;
        debug_assert!(offset + len <= self.partition);

        let bins = self.fft_len;
        self.spectrum.fill(Complex::default());
        for (bin, &sample) in self.spectrum[offset..].iter_mut().zip(chunk.iter()) {
            *bin = Complex::new(sample, 0.0);
        }
        self.forward
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // Current frame: first partition plus what earlier frames left for it.
        // The pending slot is only non-zero on the frame's first chunk.
        let current = self.slot * bins;
        for ((w, x), (h, owed)) in self
            .work
            .iter_mut()
            .zip(&self.spectrum)
            .zip(self.segments[..bins].iter().zip(&mut self.pending[current..current + bins]))
        {
            *w = x * h + *owed;
            *owed = Complex::default();
        }

        // Later partitions land whole frames ahead; sum them in the frequency domain.
        for k in 1..self.partitions {
            let target = (self.slot + k) % self.partitions * bins;
            let segment = &self.segments[k * bins..(k + 1) * bins];
            for ((owed, x), h) in self.pending[target..target + bins]
                .iter_mut()
                .zip(&self.spectrum)
                .zip(segment)
            {
                *owed += x * h;
            }
        }

        self.inverse.process_with_scratch(&mut self.work, &mut self.scratch);
        #[cfg(test)]
        {
            self.inverse_runs += 1;
        }

        // rustfft leaves the inverse unnormalized.
        let scale = 1.0 / bins as f32;
        let ring = self.tail.len();
        // Everything before `offset` was already emitted and is zero here.
        for (j, w) in self.work[..bins - 1].iter().enumerate().skip(offset) {
            self.tail[(self.start + j) % ring] += w.re * scale;
        }

        for (i, sample) in chunk.iter_mut().enumerate() {
            let index = (self.start + offset + i) % ring;
            *sample = blend_dry_wet(*sample, self.tail[index], mix);
            self.tail[index] = 0.0;
        }

        self.fill += len;
        if self.fill == self.partition {
            self.fill = 0;
            self.start = (self.start + self.partition) % ring;
            self.slot = (self.slot + 1) % self.partitions;
        }
    }

    fn reset(&mut self) {
        self.tail.fill(0.0);
        self.pending.fill(Complex::default());
        self.start = 0;
        self.slot = 0;
        self.fill = 0;
    }
}
