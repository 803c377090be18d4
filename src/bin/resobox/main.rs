//! resobox - live stereo effects with a terminal meter display
//!
//! Run with: cargo run -- --preset echo-phaser

mod app;
mod devices;
mod recording;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use resobox::{
    config::{ConvolutionParams, DelayParams, PanParams, PhaserParams},
    io::{converter::SampleFormat, wav::load_impulse},
    ChainPreset, EngineConfig, StageConfig,
};

use app::Session;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Feedback delay
    Echo,
    /// Delay into phaser
    EchoPhaser,
    /// Convolution with the impulse response
    Room,
    /// Convolution, delay and phaser
    Full,
}

impl From<Preset> for ChainPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Echo => ChainPreset::Echo,
            Preset::EchoPhaser => ChainPreset::EchoPhaser,
            Preset::Room => ChainPreset::Room,
            Preset::Full => ChainPreset::Full,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "resobox")]
#[command(version, about = "Real-time delay, phaser and convolution effects", long_about = None)]
struct Args {
    /// Input device index (see --list-devices); default device if omitted
    #[arg(short, long)]
    input: Option<usize>,

    /// Output device index (see --list-devices); default device if omitted
    #[arg(short, long)]
    output: Option<usize>,

    /// List audio devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Impulse response WAV for the convolution stage
    #[arg(long)]
    impulse: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Preset::Echo)]
    preset: Preset,

    /// Delay time in milliseconds
    #[arg(long, default_value_t = 500.0)]
    delay_ms: f32,

    /// Delay feedback (0.0 - 0.99)
    #[arg(long, default_value_t = 0.5)]
    feedback: f32,

    /// Delay wet/dry mix (0.0 - 1.0)
    #[arg(long, default_value_t = 0.5)]
    mix: f32,

    /// Phaser LFO rate in Hz
    #[arg(long, default_value_t = 0.5)]
    phaser_rate: f32,

    /// Phaser modulation depth (-0.9 - 0.9)
    #[arg(long, default_value_t = 0.6)]
    phaser_depth: f32,

    /// Phaser feedback; feedback + |depth| must stay below 0.99
    #[arg(long, default_value_t = 0.3)]
    phaser_feedback: f32,

    /// Number of phaser all-pass stages
    #[arg(long, default_value_t = 4)]
    phaser_stages: usize,

    /// Convolution wet/dry mix (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    room_mix: f32,

    /// Append a stereo balance stage (0.0 = left, 0.5 = centre, 1.0 = right)
    #[arg(long)]
    pan: Option<f32>,

    #[arg(long, default_value_t = 44_100)]
    sample_rate: u32,

    /// Frames per callback block
    #[arg(long, default_value_t = 128)]
    block_size: usize,

    /// Device sample format: f32 or i16
    #[arg(long, default_value = "f32")]
    format: SampleFormat,

    /// Print meter readings to the log instead of drawing the terminal UI
    #[arg(long)]
    headless: bool,

    /// Directory for recordings of the processed output
    #[arg(long, default_value = "recordings")]
    record_dir: PathBuf,

    /// Start recording as soon as the streams are running
    #[arg(long)]
    record: bool,

    /// Write logs to this file (the terminal UI otherwise keeps them hidden)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn engine_config(&self) -> EyreResult<EngineConfig> {
        let sample_rate = self.sample_rate as f32;
        let delay = DelayParams::new(self.delay_ms, self.feedback, self.mix)
            .wrap_err("invalid delay settings")?;
        let phaser = PhaserParams::from_hz(
            self.phaser_rate,
            sample_rate,
            self.phaser_depth,
            self.phaser_feedback,
            PhaserParams::default().mix(),
            self.phaser_stages,
        )
        .wrap_err("invalid phaser settings")?;
        let room = ConvolutionParams::new(self.room_mix).wrap_err("invalid room mix")?;

        let mut chain: Vec<StageConfig> = ChainPreset::from(self.preset)
            .stages()
            .into_iter()
            .map(|stage| match stage {
                StageConfig::Delay(_) => StageConfig::Delay(delay),
                StageConfig::Phaser(_) => StageConfig::Phaser(phaser),
                StageConfig::Convolution(_) => StageConfig::Convolution(room),
                other => other,
            })
            .collect();
        if let Some(balance) = self.pan {
            chain.push(StageConfig::Pan(
                PanParams::new(balance).wrap_err("invalid pan position")?,
            ));
        }

        let config = EngineConfig {
            sample_rate,
            block_size: self.block_size,
            sample_format: self.format,
            max_delay_ms: EngineConfig::default().max_delay_ms.max(self.delay_ms),
            chain,
            ..EngineConfig::default()
        };
        config.validate().wrap_err("invalid engine configuration")?;
        Ok(config)
    }
}

fn init_tracing(args: &Args) -> EyreResult<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if args.headless || args.list_devices {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_writer(std::io::stderr)
            .init();
    }
    // Otherwise the terminal UI owns the screen and logs are dropped.
    Ok(())
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args)?;

    if args.list_devices {
        return devices::print_devices();
    }

    let config = args.engine_config()?;

    let impulse = match &args.impulse {
        Some(path) => match load_impulse(path) {
            Ok((info, impulse)) => {
                if info.sample_rate != args.sample_rate {
                    tracing::warn!(
                        file_rate = info.sample_rate,
                        stream_rate = args.sample_rate,
                        "impulse response sample rate differs from stream; playing unresampled"
                    );
                }
                Some(impulse)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not load impulse response");
                None
            }
        },
        None => None,
    };

    Session {
        config,
        impulse,
        input: args.input,
        output: args.output,
        headless: args.headless,
        record_dir: args.record_dir,
        record: args.record,
    }
    .run()
}
