//! The per-block entry point handed to the audio backend.
//!
//! [`AudioCallback::process`] is the only thing that runs on the real-time
//! thread. It pulls pending control messages, deinterleaves the input into
//! preallocated stereo scratch (duplicating mono), runs the pipeline in
//! chunks that fit the scratch, and interleaves the result into the output.
//! Each processed chunk is also offered to the control port for recording.

use crate::{
    engine::{
        control::{ControlPort, Detached, StopHandle},
        pipeline::EffectPipeline,
    },
    error::{Error, Result},
    io::converter::AudioSample,
    MAX_BLOCK_SIZE,
};

/// What the backend should do after this block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackFlow {
    Continue,
    /// A stop was requested; output has been silenced.
    Complete,
}

/// Output is always interleaved stereo.
pub const OUTPUT_CHANNELS: usize = 2;

pub struct AudioCallback<C: ControlPort = Detached> {
    pipeline: EffectPipeline,
    input_channels: usize,
    left: Vec<f32>,
    right: Vec<f32>,
    control: C,
    stop: StopHandle,
}

impl AudioCallback<Detached> {
    /// Wrap a pipeline for `input_channels` interleaved input channels (1 or 2).
    ///
    /// Scratch is sized for `block_size` frames (at most [`MAX_BLOCK_SIZE`]);
    /// larger host buffers are processed in several passes.
    pub fn new(pipeline: EffectPipeline, input_channels: u16, block_size: usize) -> Result<Self> {
        if !matches!(input_channels, 1 | 2) {
            return Err(Error::UnsupportedChannels(input_channels));
        }
        if block_size == 0 {
            return Err(Error::ZeroBlockSize);
        }
        let frames = block_size.min(MAX_BLOCK_SIZE);
        Ok(Self {
            pipeline,
            input_channels: usize::from(input_channels),
            left: vec![0.0; frames],
            right: vec![0.0; frames],
            control: Detached,
            stop: StopHandle::new(),
        })
    }
}

impl<C: ControlPort> AudioCallback<C> {
    /// Attach a control link, replacing the current one.
    pub fn with_control<D: ControlPort>(self, control: D) -> AudioCallback<D> {
        AudioCallback {
            pipeline: self.pipeline,
            input_channels: self.input_channels,
            left: self.left,
            right: self.right,
            control,
            stop: self.stop,
        }
    }

    /// Handle for requesting a stop from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn pipeline(&self) -> &EffectPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut EffectPipeline {
        &mut self.pipeline
    }

    pub fn input_channels(&self) -> usize {
        self.input_channels
    }

    /// Process one host buffer.
    ///
    /// `input` is interleaved with [`input_channels`](Self::input_channels)
    /// channels, `output` is interleaved stereo. Missing input frames are
    /// treated as silence; a trailing partial frame in `output` is zeroed.
    pub fn process<T: AudioSample>(&mut self, input: &[T], output: &mut [T]) -> CallbackFlow {
        if self.stop.is_stopped() {
            output.fill(T::EQUILIBRIUM);
            return CallbackFlow::Complete;
        }

        while let Some(message) = self.control.poll() {
            self.pipeline.handle(message);
        }

        let channels = self.input_channels;
        let input_frames = input.len() / channels;
        let total_frames = output.len() / OUTPUT_CHANNELS;

        let mut start = 0;
        while start < total_frames {
            let frames = self.left.len().min(total_frames - start);

            for (i, (l, r)) in self.left[..frames]
                .iter_mut()
                .zip(&mut self.right[..frames])
                .enumerate()
            {
                let frame = start + i;
                (*l, *r) = if frame < input_frames {
                    let base = frame * channels;
                    let first = input[base].to_f32();
                    if channels == 1 {
                        (first, first)
                    } else {
                        (first, input[base + 1].to_f32())
                    }
                } else {
                    (0.0, 0.0)
                };
            }

            if let Some(reading) = self
                .pipeline
                .process(&mut self.left[..frames], &mut self.right[..frames])
            {
                self.control.publish(reading);
            }
            self.control.capture(&self.left[..frames], &self.right[..frames]);

            let dest = &mut output[start * OUTPUT_CHANNELS..(start + frames) * OUTPUT_CHANNELS];
            for ((out, &l), &r) in dest
                .chunks_exact_mut(OUTPUT_CHANNELS)
                .zip(&self.left[..frames])
                .zip(&self.right[..frames])
            {
                out[0] = T::from_f32(l);
                out[1] = T::from_f32(r);
            }

            start += frames;
        }

        output[total_frames * OUTPUT_CHANNELS..].fill(T::EQUILIBRIUM);

        CallbackFlow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{DelayParams, EngineConfig, PhaserParams, StageConfig},
        engine::pipeline::EffectPipeline,
    };

    fn passthrough(input_channels: u16, block_size: usize) -> AudioCallback {
        AudioCallback::new(EffectPipeline::new(44_100.0), input_channels, block_size).unwrap()
    }

    #[test]
    fn test_mono_is_duplicated() {
        let mut callback = passthrough(1, 8);
        let input = [0.1f32, 0.2, 0.3];
        let mut output = [9.0f32; 6];
        assert_eq!(callback.process(&input, &mut output), CallbackFlow::Continue);
        assert_eq!(output, [0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
    }

    #[test]
    fn test_short_input_is_padded() {
        let mut callback = passthrough(2, 8);
        let input = [0.5f32, -0.5];
        let mut output = [9.0f32; 7];
        callback.process(&input, &mut output);
        assert_eq!(output, [0.5, -0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_large_buffer_is_chunked() {
        let config = EngineConfig {
            chain: vec![
                StageConfig::Delay(DelayParams::new(5.0, 0.6, 0.5).unwrap()),
                StageConfig::Phaser(PhaserParams::default()),
            ],
            ..EngineConfig::default()
        };
        let pipeline = EffectPipeline::from_config(&config, None).unwrap();
        let mut chunked = AudioCallback::new(pipeline, 1, 16).unwrap();
        let pipeline = EffectPipeline::from_config(&config, None).unwrap();
        let mut whole = AudioCallback::new(pipeline, 1, 1024).unwrap();

        let input: Vec<f32> = (0..1000).map(|i| ((i * 7) % 13) as f32 / 13.0 - 0.5).collect();
        let mut out_chunked = vec![0.0f32; 2000];
        let mut out_whole = vec![0.0f32; 2000];
        chunked.process(&input, &mut out_chunked);
        whole.process(&input, &mut out_whole);
        assert_eq!(out_chunked, out_whole);
    }

    #[test]
    fn test_rejects_bad_layout() {
        let pipeline = EffectPipeline::new(44_100.0);
        assert!(matches!(
            AudioCallback::new(pipeline, 4, 128),
            Err(Error::UnsupportedChannels(4))
        ));
        let pipeline = EffectPipeline::new(44_100.0);
        assert!(matches!(AudioCallback::new(pipeline, 1, 0), Err(Error::ZeroBlockSize)));
    }

    #[test]
    fn test_stop_completes_and_silences() {
        let mut callback = passthrough(1, 8);
        callback.stop_handle().request_stop();
        let mut output = [1i16; 4];
        assert_eq!(callback.process(&[100i16, 200], &mut output), CallbackFlow::Complete);
        assert_eq!(output, [0; 4]);
        // Still safe to call again.
        assert_eq!(callback.process(&[100i16, 200], &mut output), CallbackFlow::Complete);
    }
}
