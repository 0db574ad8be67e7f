use clap::Parser;
use std::path::PathBuf;
use termeq::config::DeviceSelector;
use termeq::settings::Settings;
use termeq::{app, capture, logging, EqConfig, EqError};

#[derive(Parser)]
#[command(name = "termeq")]
#[command(author = "Terminal Art Generator")]
#[command(version)]
#[command(about = "Terminal audio spectrum equalizer", long_about = None)]
struct Cli {
    /// Input channel to plot (default: the first)
    #[arg(value_name = "CHANNEL", default_value = "1")]
    channel: usize,

    /// Show list of audio devices and exit
    #[arg(short, long)]
    list_devices: bool,

    /// Input device (numeric ID or substring)
    #[arg(short, long)]
    device: Option<String>,

    /// Sampling rate of audio device
    #[arg(short = 'r', long)]
    samplerate: Option<f64>,

    /// Keep every Nth sample
    #[arg(short = 'n', long, value_name = "N")]
    downsample: Option<usize>,

    /// Block duration in milliseconds
    #[arg(short, long)]
    block_ms: Option<u32>,

    /// Color scheme (0=classic, 1=fire, 2=ice, 3=mono, 4=neon)
    #[arg(short, long)]
    scheme: Option<u8>,

    /// Settings file (default: ~/.config/termeq/config.toml)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Write a debug log to /tmp/termeq.log
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<(), EqError> {
    let cli = Cli::parse();

    if cli.list_devices {
        return capture::list_devices();
    }

    logging::init(cli.debug)?;

    let settings = Settings::load(cli.settings.as_deref())?;
    let defaults = EqConfig::default();

    let sample_rate = cli.samplerate.or(settings.audio.samplerate);
    if let Some(rate) = sample_rate {
        EqConfig::validate_sample_rate(rate)?;
    }

    let config = EqConfig {
        channel: EqConfig::channel_index(cli.channel)?,
        device: cli
            .device
            .or(settings.audio.device.clone())
            .map(|d| DeviceSelector::parse(&d)),
        sample_rate,
        downsample: cli
            .downsample
            .or(settings.audio.downsample)
            .unwrap_or(defaults.downsample)
            .max(1),
        block_ms: cli
            .block_ms
            .or(settings.audio.block_ms)
            .unwrap_or(defaults.block_ms)
            .max(1),
        color_scheme: cli
            .scheme
            .or(settings.display.scheme)
            .unwrap_or(defaults.color_scheme),
    };

    app::run(&config, settings.band_table(), settings.calibration)
}
