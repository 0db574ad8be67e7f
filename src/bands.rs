//! Frequency band table
//!
//! Bands are absolute (low, high) ranges in Hz. They do not partition the
//! spectrum: some neighbours leave gaps (400-450 Hz in the default table).
//! Bands beyond what the active sample rate can represent are kept and simply
//! read as the level floor.

/// A single (low, high) frequency range in Hz, drawn as one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl Band {
    pub const fn new(low_hz: f64, high_hz: f64) -> Self {
        Self { low_hz, high_hz }
    }
}

/// Default layout: 27 bands from 20 Hz to 12 kHz, denser in the bass.
const DEFAULT_BANDS: [(f64, f64); 27] = [
    (20.0, 40.0),
    (40.0, 60.0),
    (60.0, 80.0),
    (80.0, 100.0),
    (100.0, 150.0),
    (150.0, 200.0),
    (200.0, 250.0),
    (250.0, 300.0),
    (300.0, 350.0),
    (350.0, 400.0),
    (450.0, 500.0),
    (500.0, 600.0),
    (600.0, 700.0),
    (700.0, 800.0),
    (800.0, 900.0),
    (900.0, 1000.0),
    (1000.0, 1500.0),
    (1500.0, 2000.0),
    (2000.0, 2500.0),
    (2500.0, 3000.0),
    (3000.0, 3500.0),
    (3500.0, 4000.0),
    (4000.0, 4500.0),
    (4500.0, 5000.0),
    (5000.0, 7000.0),
    (7000.0, 10000.0),
    (10000.0, 12000.0),
];

/// Ordered, immutable sequence of bands fixed for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct BandTable {
    bands: Vec<Band>,
}

impl BandTable {
    pub fn new(bands: Vec<Band>) -> Self {
        Self { bands }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self::new(pairs.iter().map(|&(lo, hi)| Band::new(lo, hi)).collect())
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Band> {
        self.bands.iter()
    }
}

impl Default for BandTable {
    fn default() -> Self {
        Self::from_pairs(&DEFAULT_BANDS)
    }
}

impl<'a> IntoIterator for &'a BandTable {
    type Item = &'a Band;
    type IntoIter = std::slice::Iter<'a, Band>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}
