//! Capturing the processed output for recording.
//!
//! The audio side holds a [`RecordTap`] and copies each processed chunk into
//! a sample queue while recording is armed. A [`Recorder`] on another thread
//! drains the queue into a [`RecordingWriter`]. When the queue cannot take a
//! whole chunk the chunk is skipped and counted, so frames never tear.

use std::{
    path::Path,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    engine::callback::OUTPUT_CHANNELS,
    error::Result,
    io::wav::{RecordingInfo, RecordingWriter},
};

#[derive(Debug, Default)]
struct Shared {
    armed: AtomicBool,
    overruns: AtomicUsize,
}

/// Audio-side end: pushes interleaved stereo while armed.
pub struct RecordTap {
    samples: Producer<f32>,
    shared: Arc<Shared>,
}

impl RecordTap {
    pub fn is_armed(&self) -> bool {
        self.shared.armed.load(Ordering::Acquire)
    }

    /// Queue one processed stereo chunk. Never blocks or allocates.
    pub fn capture(&mut self, left: &[f32], right: &[f32]) {
        if !self.is_armed() {
            return;
        }
        let frames = left.len().min(right.len());
        match self.samples.write_chunk_uninit(frames * OUTPUT_CHANNELS) {
            Ok(chunk) => {
                let interleaved = left[..frames]
                    .iter()
                    .zip(&right[..frames])
                    .flat_map(|(&l, &r)| [l, r]);
                chunk.fill_from_iter(interleaved);
            }
            Err(_) => {
                self.shared.overruns.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Control-side end: owns the file while a recording is running.
pub struct Recorder {
    samples: Consumer<f32>,
    shared: Arc<Shared>,
    writer: Option<RecordingWriter>,
}

impl Recorder {
    pub fn is_recording(&self) -> bool {
        self.writer.is_some()
    }

    /// Chunks dropped because the queue was full.
    pub fn overruns(&self) -> usize {
        self.shared.overruns.load(Ordering::Relaxed)
    }

    /// Open `path` and arm the tap. Any running recording is finished first.
    pub fn start(&mut self, path: impl AsRef<Path>, sample_rate: u32) -> Result<Option<RecordingInfo>> {
        let previous = self.stop()?;
        // Leftovers from before the stop belong to no file.
        let stale = self.samples.slots();
        if let Ok(chunk) = self.samples.read_chunk(stale) {
            chunk.commit_all();
        }
        self.writer = Some(RecordingWriter::create(path, sample_rate)?);
        self.shared.overruns.store(0, Ordering::Relaxed);
        self.shared.armed.store(true, Ordering::Release);
        tracing::info!(sample_rate, "recording started");
        Ok(previous)
    }

    /// Move queued samples into the file. Returns the number of samples written.
    pub fn pump(&mut self) -> Result<usize> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(0);
        };
        // Whole frames only; an odd sample waits for its partner.
        let available = self.samples.slots() / OUTPUT_CHANNELS * OUTPUT_CHANNELS;
        if available == 0 {
            return Ok(0);
        }
        let Ok(chunk) = self.samples.read_chunk(available) else {
            return Ok(0);
        };
        let (first, second) = chunk.as_slices();
        writer.write_interleaved(first)?;
        writer.write_interleaved(second)?;
        chunk.commit_all();
        Ok(available)
    }

    /// Disarm the tap, flush what is queued and close the file.
    pub fn stop(&mut self) -> Result<Option<RecordingInfo>> {
        self.shared.armed.store(false, Ordering::Release);
        if self.writer.is_none() {
            return Ok(None);
        }
        self.pump()?;
        match self.writer.take() {
            Some(writer) => writer.finalize().map(Some),
            None => Ok(None),
        }
    }
}

/// Create a linked tap and recorder with room for `capacity_frames` stereo frames.
pub fn record_channel(capacity_frames: usize) -> (Recorder, RecordTap) {
    let (tx, rx) = RingBuffer::new(capacity_frames.max(1) * OUTPUT_CHANNELS);
    let shared = Arc::new(Shared::default());
    (
        Recorder {
            samples: rx,
            shared: Arc::clone(&shared),
            writer: None,
        },
        RecordTap { samples: tx, shared },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use tempfile::tempdir;

    #[test]
    fn test_disarmed_tap_queues_nothing() {
        let (mut recorder, mut tap) = record_channel(16);
        tap.capture(&[0.5; 4], &[0.5; 4]);
        assert!(!recorder.is_recording());
        assert_eq!(recorder.pump().unwrap(), 0);
        assert_eq!(recorder.stop().unwrap(), None);
    }

    #[test]
    fn test_records_interleaved_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let (mut recorder, mut tap) = record_channel(64);

        recorder.start(&path, 44_100).unwrap();
        assert!(tap.is_armed());
        tap.capture(&[0.5, 0.25], &[-0.5, 0.0]);
        assert_eq!(recorder.pump().unwrap(), 4);
        tap.capture(&[1.0], &[-1.0]);

        let info = recorder.stop().unwrap().unwrap();
        assert_eq!(info.frames, 3);
        assert!(!tap.is_armed());

        let samples: Vec<i32> = WavReader::open(&path)
            .unwrap()
            .samples::<i32>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples.len(), 6);
        assert_eq!(samples[0], 4_194_304);
        assert_eq!(samples[1], -4_194_304);
        assert_eq!(samples[3], 0);
        assert_eq!(samples[4], 8_388_607);
    }

    #[test]
    fn test_full_queue_skips_whole_chunks() {
        let dir = tempdir().unwrap();
        let (mut recorder, mut tap) = record_channel(4);
        recorder.start(dir.path().join("short.wav"), 8_000).unwrap();

        tap.capture(&[0.1; 3], &[0.1; 3]);
        tap.capture(&[0.2; 3], &[0.2; 3]);
        assert_eq!(recorder.overruns(), 1);

        let info = recorder.stop().unwrap().unwrap();
        assert_eq!(info.frames, 3);
    }

    #[test]
    fn test_restart_discards_stale_samples() {
        let dir = tempdir().unwrap();
        let (mut recorder, mut tap) = record_channel(16);
        recorder.start(dir.path().join("a.wav"), 8_000).unwrap();
        tap.capture(&[0.1; 2], &[0.1; 2]);

        let first = recorder.start(dir.path().join("b.wav"), 8_000).unwrap().unwrap();
        assert_eq!(first.frames, 2);
        tap.capture(&[0.3; 1], &[0.3; 1]);
        let second = recorder.stop().unwrap().unwrap();
        assert_eq!(second.frames, 1);
    }
}
