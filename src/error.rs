use thiserror::Error;

/// Errors surfaced by the equalizer.
///
/// Degenerate bands (empty or out-of-range spectrum slices) are not errors:
/// they read as the level floor and never reach this type.
#[derive(Debug, Error)]
pub enum EqError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    #[error("failed to read device name: {0}")]
    DeviceName(#[from] cpal::DeviceNameError),

    #[error("no supported input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start input stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("audio stream error: {0}")]
    Stream(#[from] cpal::StreamError),

    #[error("invalid settings file: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("invalid calibration: {0}")]
    InvalidCalibration(String),

    #[error("no audio input device found")]
    NoInputDevice,

    #[error("no input device matches {0:?}")]
    DeviceNotFound(String),

    #[error("sample rate must be a positive number, got {0}")]
    InvalidSampleRate(f64),

    #[error("argument CHANNEL: must be >= 1")]
    InvalidChannel,

    #[error("channel {channel} requested but device has {available} channel(s)")]
    ChannelOutOfRange { channel: usize, available: usize },

    #[error("unsupported sample format {0:?}, only f32 input is supported")]
    UnsupportedSampleFormat(cpal::SampleFormat),

    #[error("block processed before the sample rate was configured")]
    NotConfigured,
}
