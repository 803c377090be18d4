//! Impulse response loading and output recording as WAV files.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{dsp::convolution::ImpulseResponse, error::Result};

/// Header facts about an impulse response file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImpulseInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: u32,
}

pub struct ImpulseReader {
    reader: WavReader<BufReader<File>>,
}

impl ImpulseReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            reader: WavReader::open(path)?,
        })
    }

    pub fn info(&self) -> ImpulseInfo {
        let spec = self.reader.spec();
        ImpulseInfo {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            frames: self.reader.duration(),
        }
    }

    /// Decode the whole file, averaging all channels down to mono.
    ///
    /// Integer samples are normalized to `[-1, 1)`.
    pub fn read_mono(mut self) -> Result<ImpulseResponse> {
        let spec = self.reader.spec();
        let channels = usize::from(spec.channels.max(1));

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => self.reader.samples::<f32>().collect::<Result<_, _>>()?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                self.reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let mono: Vec<f32> = interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Ok(ImpulseResponse::from(mono))
    }
}

/// Open and decode an impulse response in one step.
pub fn load_impulse(path: impl AsRef<Path>) -> Result<(ImpulseInfo, ImpulseResponse)> {
    let path = path.as_ref();
    let reader = ImpulseReader::open(path)?;
    let info = reader.info();
    let impulse = reader.read_mono()?;
    tracing::info!(
        path = %path.display(),
        sample_rate = info.sample_rate,
        channels = info.channels,
        taps = impulse.len(),
        "impulse response loaded"
    );
    Ok((info, impulse))
}

/// Bit depth of recorded files.
pub const RECORDING_BITS: u16 = 24;
const RECORDING_FULL_SCALE: f32 = ((1 << (RECORDING_BITS - 1)) - 1) as f32;

/// A finished recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingInfo {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub frames: u64,
}

/// Stereo 24-bit PCM writer for the processed output.
pub struct RecordingWriter {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    sample_rate: u32,
    frames: u64,
}

impl RecordingWriter {
    pub fn create(path: impl AsRef<Path>, sample_rate: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: RECORDING_BITS,
            sample_format: SampleFormat::Int,
        };
        Ok(Self {
            writer: WavWriter::create(&path, spec)?,
            path,
            sample_rate,
            frames: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Append interleaved stereo samples. A trailing odd sample is ignored.
    pub fn write_interleaved(&mut self, samples: &[f32]) -> Result<()> {
        for frame in samples.chunks_exact(2) {
            self.writer.write_sample(to_pcm24(frame[0]))?;
            self.writer.write_sample(to_pcm24(frame[1]))?;
            self.frames += 1;
        }
        Ok(())
    }

    /// Patch the header and close the file.
    pub fn finalize(self) -> Result<RecordingInfo> {
        self.writer.finalize()?;
        tracing::info!(path = %self.path.display(), frames = self.frames, "recording saved");
        Ok(RecordingInfo {
            path: self.path,
            sample_rate: self.sample_rate,
            frames: self.frames,
        })
    }
}

fn to_pcm24(sample: f32) -> i32 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * RECORDING_FULL_SCALE).round() as i32
}

/// `recording-<unix seconds>.wav` inside `dir`.
pub fn recording_path(dir: impl AsRef<Path>, unix_secs: u64) -> PathBuf {
    dir.as_ref().join(format!("recording-{unix_secs}.wav"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use hound::{WavSpec, WavWriter};
    use tempfile::tempdir;

    fn write_wav(path: &Path, spec: WavSpec, write: impl FnOnce(&mut WavWriter<std::io::BufWriter<File>>)) {
        let mut writer = WavWriter::create(path, spec).unwrap();
        write(&mut writer);
        writer.finalize().unwrap();
    }

    #[test]
    fn test_reads_float_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ir.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        write_wav(&path, spec, |w| {
            for s in [1.0f32, 0.5, 0.25] {
                w.write_sample(s).unwrap();
            }
        });

        let reader = ImpulseReader::open(&path).unwrap();
        assert_eq!(
            reader.info(),
            ImpulseInfo {
                sample_rate: 48_000,
                channels: 1,
                frames: 3
            }
        );
        let impulse = reader.read_mono().unwrap();
        assert_eq!(impulse.as_slice(), &[1.0, 0.5, 0.25]);
    }

    #[test]
    fn test_averages_stereo_int() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ir16.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        write_wav(&path, spec, |w| {
            // frame 0: (0.5, 0.0), frame 1: (-0.5, -0.5)
            for s in [16_384i16, 0, -16_384, -16_384] {
                w.write_sample(s).unwrap();
            }
        });

        let (info, impulse) = load_impulse(&path).unwrap();
        assert_eq!(info.channels, 2);
        assert_eq!(info.frames, 2);
        assert_eq!(impulse.len(), 2);
        assert!((impulse.as_slice()[0] - 0.25).abs() < 1e-6);
        assert!((impulse.as_slice()[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_is_wav_error() {
        let dir = tempdir().unwrap();
        let result = ImpulseReader::open(dir.path().join("absent.wav"));
        assert!(matches!(result, Err(Error::Wav(_))));
    }

    #[test]
    fn test_empty_file_yields_empty_impulse() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        let spec = WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        write_wav(&path, spec, |_| {});

        let (_, impulse) = load_impulse(&path).unwrap();
        assert!(impulse.is_empty());
        assert!(matches!(impulse.validate(), Err(Error::EmptyImpulseResponse)));
    }

    #[test]
    fn test_recording_round_trip() {
        let dir = tempdir().unwrap();
        let path = recording_path(dir.path(), 1_700_000_000);
        assert!(path.ends_with("recording-1700000000.wav"));

        let mut writer = RecordingWriter::create(&path, 48_000).unwrap();
        writer.write_interleaved(&[0.5, -0.5, 1.5, f32::NAN, 0.25]).unwrap();
        assert_eq!(writer.frames(), 2);
        let info = writer.finalize().unwrap();
        assert_eq!(info.frames, 2);
        assert_eq!(info.path, path);

        let mut reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!((spec.channels, spec.sample_rate, spec.bits_per_sample), (2, 48_000, 24));
        let samples: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![4_194_304, -4_194_304, 8_388_607, 0]);
    }
}
