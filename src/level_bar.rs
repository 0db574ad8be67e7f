//! Bounded level bar with a decaying peak marker
//!
//! Each bar holds an integer level clamped to `0..=max_level` and a float
//! peak. Every `set_level` call drops the peak by a fixed step before
//! comparing, so the peak falls at a rate tied to how often bars are updated
//! (once per audio block), not to wall-clock time. A new level at or above
//! the decayed peak snaps the peak up immediately.

use crate::colors::Palette;
use crate::config::Calibration;
use crate::terminal::Surface;

/// Glyph used for both the bar body and the peak marker
const BAR_GLYPH: char = '-';

/// Color intensity tier, 0 (quietest) to 3 (loudest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColorTier(u8);

impl ColorTier {
    pub const MAX: u8 = 3;

    pub fn new(tier: u8) -> Self {
        Self(tier.min(Self::MAX))
    }

    /// Tier for a bar row: steps up at each threshold reached.
    pub fn for_row(row: i32, thresholds: &[i32; 3]) -> Self {
        let reached = thresholds.iter().filter(|&&t| row >= t).count();
        Self(reached as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One vertical bar: current level, held peak and fixed screen column.
#[derive(Debug, Clone)]
pub struct LevelBar {
    level: i32,
    peak: f32,
    column: i32,
    base_row: i32,
    calibration: Calibration,
}

impl LevelBar {
    pub fn new(column: i32, base_row: i32, calibration: Calibration) -> Self {
        Self {
            level: 0,
            peak: 0.0,
            column,
            base_row,
            calibration,
        }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    pub fn column(&self) -> i32 {
        self.column
    }

    pub fn base_row(&self) -> i32 {
        self.base_row
    }

    /// Clamp, decay the peak one step, then let the peak catch up.
    pub fn set_level(&mut self, raw: i32) {
        self.level = raw.clamp(0, self.calibration.max_level);

        self.peak -= self.calibration.peak_decay;

        if self.level as f32 >= self.peak {
            self.peak = self.level as f32;
        }
    }

    pub fn reset(&mut self) {
        self.level = 0;
        self.peak = 0.0;
    }

    pub fn set_base_row(&mut self, base_row: i32) {
        self.base_row = base_row;
    }

    /// Row holding the peak marker (may sit one row below the base at rest)
    pub fn marker_row(&self) -> i32 {
        self.base_row - self.peak.floor() as i32 + 1
    }

    /// Draw body rows bottom-up and the peak marker. Never clears.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, palette: &Palette) {
        for i in 0..self.level {
            let tier = ColorTier::for_row(i, &self.calibration.tier_thresholds);
            self.put_pair(surface, self.base_row - i, palette.tier(tier));
        }

        self.put_pair(surface, self.marker_row(), palette.marker);
    }

    fn put_pair<S: Surface + ?Sized>(&self, surface: &mut S, row: i32, color: crossterm::style::Color) {
        surface.put(row, self.column, BAR_GLYPH, color);
        surface.put(row, self.column + 1, BAR_GLYPH, color);
    }
}
