use crate::bands::BandTable;
use crate::config::Calibration;
use crate::error::EqError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of `config.toml`. Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub audio: AudioSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub bands: BandSettings,
    #[serde(default)]
    pub calibration: Calibration,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioSettings {
    pub device: Option<String>,     // Index or name substring, like --device
    pub samplerate: Option<f64>,
    pub block_ms: Option<u32>,
    pub downsample: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DisplaySettings {
    pub scheme: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BandSettings {
    pub table: Option<Vec<(f64, f64)>>,   // [[low, high], ...] in Hz
}

impl Settings {
    /// Load from `path`, or from the default location when `None`.
    /// A missing default file is not an error; a missing explicit one is.
    pub fn load(path: Option<&Path>) -> Result<Self, EqError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, EqError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, EqError> {
        let settings: Self = toml::from_str(content)?;
        settings.calibration.validate()?;
        Ok(settings)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("termeq")
            .join("config.toml")
    }

    /// Configured band table, falling back to the built-in layout.
    pub fn band_table(&self) -> BandTable {
        match &self.bands.table {
            Some(pairs) => BandTable::from_pairs(pairs),
            None => BandTable::default(),
        }
    }
}
