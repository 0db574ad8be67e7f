use crate::error::EqError;
use serde::Deserialize;

/// Calibration constants for turning spectra into bar levels.
///
/// The defaults are tuned for speech/music at default device gain.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Highest displayable level (rows per bar)
    pub max_level: i32,
    /// Peak marker drop per `set_level` call
    pub peak_decay: f32,
    /// Multiplier applied to a band's maximum magnitude
    pub magnitude_scale: f64,
    /// Added to every band value; degenerate bands read exactly this
    pub level_floor: i32,
    /// Multiplier applied to the block's maximum sample for the volume seed
    pub volume_scale: f32,
    /// Row indices at which the color tier steps up (tiers 1, 2, 3)
    pub tier_thresholds: [i32; 3],
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            max_level: 20,
            peak_decay: 0.5,
            magnitude_scale: 1000.0,
            level_floor: 1,
            volume_scale: 10.0,
            tier_thresholds: [3, 5, 7],
        }
    }
}

impl Calibration {
    /// Reject values that would break bar clamping or peak decay.
    pub fn validate(&self) -> Result<(), EqError> {
        let invalid = |msg: String| Err(EqError::InvalidCalibration(msg));

        if self.max_level < 0 {
            return invalid(format!("max_level must be >= 0, got {}", self.max_level));
        }
        if !(self.peak_decay.is_finite() && self.peak_decay >= 0.0) {
            return invalid(format!("peak_decay must be >= 0, got {}", self.peak_decay));
        }
        if !self.magnitude_scale.is_finite() {
            return invalid(format!("magnitude_scale must be finite, got {}", self.magnitude_scale));
        }
        if !self.volume_scale.is_finite() {
            return invalid(format!("volume_scale must be finite, got {}", self.volume_scale));
        }
        Ok(())
    }
}

/// How the user picked an input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceSelector {
    /// Position in the host's input device list
    Index(usize),
    /// Case-insensitive substring of the device name
    Name(String),
}

impl DeviceSelector {
    /// Numeric text selects by index, anything else by name.
    pub fn parse(text: &str) -> Self {
        match text.trim().parse::<usize>() {
            Ok(index) => DeviceSelector::Index(index),
            Err(_) => DeviceSelector::Name(text.to_string()),
        }
    }
}

/// Validated runtime parameters for one capture session.
#[derive(Debug, Clone)]
pub struct EqConfig {
    /// Zero-based channel index within the device's interleaved frames
    pub channel: usize,
    pub device: Option<DeviceSelector>,
    pub sample_rate: Option<f64>,
    /// Keep every Nth sample of the channel (1 = no decimation)
    pub downsample: usize,
    /// Block duration in milliseconds
    pub block_ms: u32,
    pub color_scheme: u8,
}

impl Default for EqConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            device: None,
            sample_rate: None,
            downsample: 1,
            block_ms: 50,
            color_scheme: 0,
        }
    }
}

impl EqConfig {
    /// Convert a 1-based CHANNEL argument to an index.
    pub fn channel_index(channel: usize) -> Result<usize, EqError> {
        channel.checked_sub(1).ok_or(EqError::InvalidChannel)
    }

    pub fn validate_sample_rate(rate: f64) -> Result<f64, EqError> {
        if rate.is_finite() && rate > 0.0 {
            Ok(rate)
        } else {
            Err(EqError::InvalidSampleRate(rate))
        }
    }

    /// Samples per block at the given (already downsampled) rate. Never zero.
    pub fn block_len(&self, effective_rate: f64) -> usize {
        ((effective_rate * self.block_ms as f64 / 1000.0) as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_calibration_is_valid() {
        assert!(Calibration::default().validate().is_ok());
    }

    #[test]
    fn calibration_rejects_bad_values() {
        let bad = [
            Calibration { max_level: -1, ..Calibration::default() },
            Calibration { peak_decay: -0.5, ..Calibration::default() },
            Calibration { peak_decay: f32::NAN, ..Calibration::default() },
            Calibration { magnitude_scale: f64::INFINITY, ..Calibration::default() },
            Calibration { volume_scale: f32::NAN, ..Calibration::default() },
        ];
        for calibration in bad {
            assert!(
                matches!(calibration.validate(), Err(EqError::InvalidCalibration(_))),
                "{:?}",
                calibration
            );
        }
    }

    #[test]
    fn device_selector_numeric_is_index() {
        assert_eq!(DeviceSelector::parse("3"), DeviceSelector::Index(3));
        assert_eq!(DeviceSelector::parse(" 12 "), DeviceSelector::Index(12));
    }

    #[test]
    fn device_selector_text_is_name() {
        assert_eq!(
            DeviceSelector::parse("pulse"),
            DeviceSelector::Name("pulse".to_string())
        );
    }

    #[test]
    fn channel_zero_is_rejected() {
        assert!(matches!(EqConfig::channel_index(0), Err(EqError::InvalidChannel)));
        assert_eq!(EqConfig::channel_index(1).unwrap(), 0);
    }

    #[test]
    fn sample_rate_must_be_positive() {
        assert!(EqConfig::validate_sample_rate(0.0).is_err());
        assert!(EqConfig::validate_sample_rate(-44100.0).is_err());
        assert!(EqConfig::validate_sample_rate(f64::NAN).is_err());
        assert_eq!(EqConfig::validate_sample_rate(48000.0).unwrap(), 48000.0);
    }

    #[test]
    fn block_len_from_milliseconds() {
        let config = EqConfig::default();
        assert_eq!(config.block_len(48000.0), 2400);
        assert_eq!(config.block_len(44100.0), 2205);
        assert_eq!(config.block_len(1.0), 1);
    }
}
