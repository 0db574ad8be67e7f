//! Terminal audio spectrum equalizer
//!
//! Captures one audio channel, splits each block's spectrum into fixed
//! frequency bands and draws every band as a vertical bar with a slowly
//! falling peak marker, next to an overall volume bar.

pub mod app;
pub mod bands;
pub mod capture;
pub mod colors;
pub mod config;
pub mod equalizer;
pub mod error;
pub mod help;
pub mod level_bar;
pub mod logging;
pub mod settings;
pub mod spectrum;
pub mod terminal;

pub use bands::{Band, BandTable};
pub use config::{Calibration, EqConfig};
pub use equalizer::{Equalizer, PipelineState};
pub use error::EqError;
pub use level_bar::LevelBar;
