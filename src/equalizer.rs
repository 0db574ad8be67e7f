//! Capture-to-display pipeline
//!
//! Owns the band table, one level bar per band and the volume bar. Each
//! audio block is turned into one frame:
//!
//! 1. clear the surface
//! 2. seed the volume bar from the block's largest sample
//! 3. FFT the block, aggregate per band, update and draw each band bar
//! 4. overwrite the volume bar with the mean band level and draw it
//! 5. flush the surface
//!
//! The volume bar is therefore updated twice per block and its peak drops
//! twice as fast as the band peaks.

use crate::bands::BandTable;
use crate::colors::Palette;
use crate::config::{Calibration, EqConfig};
use crate::error::EqError;
use crate::level_bar::LevelBar;
use crate::spectrum::SpectrumAnalyzer;
use crate::terminal::Surface;
use log::{debug, info};

/// Column of the volume bar
const VOLUME_COLUMN: i32 = 4;
/// Column of the first band bar
const FIRST_BAND_COLUMN: i32 = 10;
/// Horizontal distance between band bars (two glyphs plus a gap)
const BAND_SPACING: i32 = 3;
/// Rows kept free below the bars
const BOTTOM_MARGIN: i32 = 3;

/// Lifecycle of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Sample rate unknown, no bars yet
    Uninitialized,
    /// Bars built, waiting for the first block
    Configured,
    /// At least one block processed
    Running,
}

/// Bars and analyzer that exist once the sample rate is known.
struct Session {
    analyzer: SpectrumAnalyzer,
    band_bars: Vec<LevelBar>,
    volume_bar: LevelBar,
}

pub struct Equalizer {
    bands: BandTable,
    calibration: Calibration,
    state: PipelineState,
    session: Option<Session>,
}

/// Bottom row of the bars for a surface height.
pub fn base_row_for_height(height: u16) -> i32 {
    height as i32 - BOTTOM_MARGIN
}

/// Volume seed: `trunc(max_sample * scale) + 1`; an empty block reads 1.
pub fn volume_seed(samples: &[f32], calibration: &Calibration) -> i32 {
    let loudest = samples
        .iter()
        .copied()
        .reduce(f32::max)
        .unwrap_or(0.0);
    ((loudest * calibration.volume_scale).trunc() as i32).saturating_add(1)
}

/// Truncated mean of the band levels, 0 without bands.
fn mean_level(bars: &[LevelBar]) -> i32 {
    let sum: i64 = bars.iter().map(|b| b.level() as i64).sum();
    sum.checked_div(bars.len() as i64).unwrap_or(0) as i32
}

impl Equalizer {
    pub fn new(bands: BandTable, calibration: Calibration) -> Self {
        Self {
            bands,
            calibration,
            state: PipelineState::Uninitialized,
            session: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Build the analyzer and bars for a sample rate. Calling it again
    /// rebuilds everything from scratch.
    pub fn configure(&mut self, sample_rate: f64, base_row: i32) -> Result<(), EqError> {
        let sample_rate = EqConfig::validate_sample_rate(sample_rate)?;
        self.calibration.validate()?;

        let band_bars = (0..self.bands.len())
            .map(|i| {
                let column = FIRST_BAND_COLUMN + i as i32 * BAND_SPACING;
                LevelBar::new(column, base_row, self.calibration)
            })
            .collect();

        self.session = Some(Session {
            analyzer: SpectrumAnalyzer::new(sample_rate, self.calibration),
            band_bars,
            volume_bar: LevelBar::new(VOLUME_COLUMN, base_row, self.calibration),
        });
        self.state = PipelineState::Configured;

        info!(
            "Configured {} bands at {} Hz, base row {}",
            self.bands.len(),
            sample_rate,
            base_row
        );
        Ok(())
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.analyzer.sample_rate())
    }

    pub fn band_bars(&self) -> &[LevelBar] {
        match &self.session {
            Some(session) => &session.band_bars,
            None => &[],
        }
    }

    pub fn volume_bar(&self) -> Option<&LevelBar> {
        self.session.as_ref().map(|s| &s.volume_bar)
    }

    /// Current level of every band bar followed by the volume level.
    pub fn levels(&self) -> Vec<i32> {
        let mut levels: Vec<i32> = self.band_bars().iter().map(LevelBar::level).collect();
        if let Some(volume) = self.volume_bar() {
            levels.push(volume.level());
        }
        levels
    }

    /// Drop every bar back to zero level and peak.
    pub fn reset(&mut self) {
        if let Some(session) = &mut self.session {
            for bar in &mut session.band_bars {
                bar.reset();
            }
            session.volume_bar.reset();
            debug!("Bars reset");
        }
    }

    /// Re-anchor all bars after the surface changed height.
    pub fn resize(&mut self, base_row: i32) {
        if let Some(session) = &mut self.session {
            for bar in &mut session.band_bars {
                bar.set_base_row(base_row);
            }
            session.volume_bar.set_base_row(base_row);
        }
    }

    /// Draw one frame for a block of single-channel samples.
    pub fn process_block<S: Surface + ?Sized>(
        &mut self,
        samples: &[f32],
        surface: &mut S,
        palette: &Palette,
    ) -> Result<(), EqError> {
        self.render_block(samples, surface, palette)?;
        surface.flush()?;
        Ok(())
    }

    /// Same as `process_block` without the final flush, so callers can add
    /// overlays to the frame first.
    pub fn render_block<S: Surface + ?Sized>(
        &mut self,
        samples: &[f32],
        surface: &mut S,
        palette: &Palette,
    ) -> Result<(), EqError> {
        let session = self.session.as_mut().ok_or(EqError::NotConfigured)?;
        self.state = PipelineState::Running;

        surface.clear();

        session
            .volume_bar
            .set_level(volume_seed(samples, &self.calibration));

        let values = session.analyzer.band_values(samples, &self.bands);
        for (bar, value) in session.band_bars.iter_mut().zip(values) {
            bar.set_level(value);
            bar.draw(surface, palette);
        }

        session.volume_bar.set_level(mean_level(&session.band_bars));
        session.volume_bar.draw(surface, palette);

        Ok(())
    }
}
