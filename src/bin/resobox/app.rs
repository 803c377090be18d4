//! Session setup: devices, pipeline, streams, then the UI or headless loop.

use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, StreamTrait},
    Device, SizedSample, Stream,
};
use rtrb::RingBuffer;

use resobox::{
    dsp::{convolution::ImpulseResponse, meter::RmsHistory},
    engine::{control_channel, record_channel, ControlChannel, ControlHandle, StopHandle},
    io::converter::{AudioSample, SampleFormat},
    AudioCallback, EffectPipeline, EngineConfig, MAX_BLOCK_SIZE,
};

use super::{
    devices,
    recording::{RecordEvent, RecordingThread},
    ui::{
        meters::level_db,
        state::{SessionInfo, StageView},
        MeterApp,
    },
};

/// Capacity of the control and meter queues.
const CONTROL_QUEUE: usize = 256;
/// Blocks of slack between the input and output streams.
const BRIDGE_BLOCKS: usize = 8;
const REPORT_INTERVAL: Duration = Duration::from_secs(1);
/// Seconds of output the record queue can hold before chunks are skipped.
const RECORD_QUEUE_SECONDS: usize = 2;

pub struct Session {
    pub config: EngineConfig,
    pub impulse: Option<ImpulseResponse>,
    pub input: Option<usize>,
    pub output: Option<usize>,
    pub headless: bool,
    pub record_dir: PathBuf,
    /// Start recording immediately.
    pub record: bool,
}

impl Session {
    /// Open the streams and run until the user quits.
    pub fn run(mut self) -> EyreResult<()> {
        let host = cpal::default_host();
        let input_device = devices::input_device(&host, self.input)?;
        let output_device = devices::output_device(&host, self.output)?;

        let device_channels = input_device
            .default_input_config()
            .wrap_err("failed to fetch default input config")?
            .channels();
        self.config.input_channels = device_channels.clamp(1, 2);

        let pipeline = EffectPipeline::from_config(&self.config, self.impulse.as_ref())
            .wrap_err("failed to build effect pipeline")?;
        let stages: Vec<StageView> = pipeline.status().map(StageView::from).collect();

        let sample_rate = self.config.sample_rate as u32;
        let (recorder, tap) = record_channel(sample_rate as usize * RECORD_QUEUE_SECONDS);
        let (control, channel) = control_channel(CONTROL_QUEUE);
        let callback = AudioCallback::new(pipeline, self.config.input_channels, self.config.block_size)
            .wrap_err("failed to create audio callback")?
            .with_control(channel.with_recorder(tap));
        let mut recording = RecordingThread::spawn(recorder, self.record_dir.clone(), sample_rate);
        let stop = callback.stop_handle();

        let info = SessionInfo {
            input_name: input_device.name().unwrap_or_default(),
            output_name: output_device.name().unwrap_or_default(),
            sample_rate: self.config.sample_rate,
            block_size: self.config.block_size,
            input_channels: self.config.input_channels,
            format: self.config.sample_format,
            impulse_taps: self.impulse.as_ref().map(ImpulseResponse::len),
        };
        tracing::info!(
            input = %info.input_name,
            output = %info.output_name,
            channels = info.input_channels,
            format = %info.format,
            "opening streams"
        );

        let streams = match self.config.sample_format {
            SampleFormat::F32 => {
                Streams::open::<f32>(&input_device, &output_device, &self.config, callback)?
            }
            SampleFormat::I16 => {
                Streams::open::<i16>(&input_device, &output_device, &self.config, callback)?
            }
        };
        streams.play()?;
        if self.record {
            recording.toggle();
        }

        let result = if self.headless {
            run_headless(control, &mut recording, &stop)
        } else {
            let mut terminal = ratatui::init();
            let result = MeterApp::new(control, recording, stages, info).run(&mut terminal);
            ratatui::restore();
            result
        };

        stop.request_stop();
        drop(streams);
        tracing::info!("streams closed");
        result
    }
}

struct Streams {
    input: Stream,
    output: Stream,
}

impl Streams {
    /// Build an input stream feeding a sample queue and an output stream
    /// that drains it through the callback.
    fn open<T>(
        input_device: &Device,
        output_device: &Device,
        config: &EngineConfig,
        mut callback: AudioCallback<ControlChannel>,
    ) -> EyreResult<Self>
    where
        T: AudioSample + SizedSample,
    {
        let channels = usize::from(config.input_channels);
        let sample_rate = cpal::SampleRate(config.sample_rate as u32);
        let buffer_size = cpal::BufferSize::Fixed(config.block_size as u32);

        let input_config = cpal::StreamConfig {
            channels: config.input_channels,
            sample_rate,
            buffer_size,
        };
        let output_config = cpal::StreamConfig {
            channels: 2,
            sample_rate,
            buffer_size,
        };

        let (mut tx, mut rx) = RingBuffer::<T>::new(config.block_size * channels * BRIDGE_BLOCKS);

        let input = input_device
            .build_input_stream(
                &input_config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    for &sample in data {
                        if tx.push(sample).is_err() {
                            break;
                        }
                    }
                },
                |err| tracing::error!(%err, "input stream error"),
                None,
            )
            .wrap_err("failed to build input stream")?;

        let mut scratch = vec![<T as AudioSample>::EQUILIBRIUM; MAX_BLOCK_SIZE * channels];
        let output = output_device
            .build_output_stream(
                &output_config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let wanted = (data.len() / 2 * channels).min(scratch.len());
                    let ready = wanted.min(rx.slots()) / channels * channels;
                    for slot in &mut scratch[..ready] {
                        *slot = rx.pop().unwrap_or(<T as AudioSample>::EQUILIBRIUM);
                    }
                    callback.process(&scratch[..ready], data);
                },
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        Ok(Self { input, output })
    }

    fn play(&self) -> EyreResult<()> {
        self.input.play().wrap_err("failed to start input stream")?;
        self.output.play().wrap_err("failed to start output stream")?;
        Ok(())
    }
}

/// Log smoothed levels once a second until Enter is pressed.
fn run_headless(
    mut control: ControlHandle,
    recording: &mut RecordingThread,
    stop: &StopHandle,
) -> EyreResult<()> {
    let stdin_stop = stop.clone();
    thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
        stdin_stop.request_stop();
    });
    tracing::info!("running headless, press Enter to stop");

    let mut input = RmsHistory::default();
    let mut output = RmsHistory::default();
    let mut last_report = Instant::now();

    while !stop.is_stopped() {
        for reading in control.readings() {
            input.push(reading.input_rms);
            output.push(reading.output_rms);
        }
        for event in recording.poll() {
            if let RecordEvent::Started(path) = event {
                tracing::info!(path = %path.display(), "recording to file");
            }
        }
        if last_report.elapsed() >= REPORT_INTERVAL {
            let input_db = level_db(input.average());
            let output_db = level_db(output.average());
            tracing::info!(input_db, output_db, "levels");
            last_report = Instant::now();
        }
        thread::sleep(Duration::from_millis(50));
    }
    Ok(())
}
