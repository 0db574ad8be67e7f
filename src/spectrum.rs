//! Per-block spectrum analysis and band aggregation
//!
//! # Algorithm
//! 1. Real FFT of the raw block (no window), magnitudes scaled by `2/N`.
//! 2. Bin centers `k * sample_rate / N` for `k = 0..=N/2`.
//! 3. Both arrays are cut to their first half. This is not needed for a
//!    real transform, but band levels are calibrated against it.
//! 4. Each band `(low, high)` maps to bins `[low/step, high/step)`; the
//!    band value is `trunc(max * scale) + floor`. A band whose bins are
//!    empty or past the end of the array reads exactly `floor`.

use crate::bands::{Band, BandTable};
use crate::config::Calibration;
use log::trace;
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

/// Magnitude and bin-center arrays for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub magnitudes: Vec<f64>,
    pub frequencies: Vec<f64>,
}

impl Spectrum {
    /// Keep the first `len / 2` entries of both arrays.
    pub fn halved(mut self) -> Self {
        let halfway = self.magnitudes.len() / 2;
        self.magnitudes.truncate(halfway);
        self.frequencies.truncate(halfway);
        self
    }

    /// Width of one bin in Hz, `None` with fewer than two bins.
    pub fn frequency_step(&self) -> Option<f64> {
        match self.frequencies.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// Half-open bin range for a band, clamped to `len`. `None` if empty.
pub fn band_bins(band: &Band, step: f64, len: usize) -> Option<std::ops::Range<usize>> {
    if !(step.is_finite() && step > 0.0) {
        return None;
    }
    let bottom = (band.low_hz / step).floor();
    let top = (band.high_hz / step).floor();
    if !(bottom.is_finite() && top.is_finite()) || bottom < 0.0 {
        return None;
    }

    let bottom = bottom as usize;
    let top = (top as usize).min(len);
    if bottom < top {
        Some(bottom..top)
    } else {
        None
    }
}

/// Raw level for one band of a (halved) spectrum.
pub fn band_value(spectrum: &Spectrum, band: &Band, calibration: &Calibration) -> i32 {
    let floor = calibration.level_floor;
    let bins = spectrum
        .frequency_step()
        .and_then(|step| band_bins(band, step, spectrum.len()));

    let Some(bins) = bins else {
        return floor;
    };

    let peak = spectrum.magnitudes[bins]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    // inf/NaN samples poison every bin; such a band reads as degenerate
    let scaled = peak * calibration.magnitude_scale;
    if !scaled.is_finite() {
        return floor;
    }

    (scaled.trunc() as i32).saturating_add(floor)
}

/// Real FFT front end bound to one session sample rate.
pub struct SpectrumAnalyzer {
    sample_rate: f64,
    calibration: Calibration,
    fft: Option<Arc<dyn RealToComplex<f64>>>,
    input: Vec<f64>,
    output: Vec<Complex<f64>>,
}

impl SpectrumAnalyzer {
    pub fn new(sample_rate: f64, calibration: Calibration) -> Self {
        Self {
            sample_rate,
            calibration,
            fft: None,
            input: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Re-plan only when the block length changes.
    fn plan(&mut self, len: usize) -> Arc<dyn RealToComplex<f64>> {
        if let Some(fft) = &self.fft {
            if fft.len() == len {
                return Arc::clone(fft);
            }
        }

        let fft = RealFftPlanner::<f64>::new().plan_fft_forward(len);
        self.input = fft.make_input_vec();
        self.output = fft.make_output_vec();
        self.fft = Some(Arc::clone(&fft));
        fft
    }

    /// Un-halved magnitude spectrum of a block.
    pub fn spectrum(&mut self, samples: &[f32]) -> Spectrum {
        let n = samples.len();
        if n == 0 {
            return Spectrum {
                magnitudes: Vec::new(),
                frequencies: Vec::new(),
            };
        }

        let fft = self.plan(n);
        for (dst, &src) in self.input.iter_mut().zip(samples) {
            *dst = src as f64;
        }

        if let Err(e) = fft.process(&mut self.input, &mut self.output) {
            trace!("fft failed for {} samples: {}", n, e);
            return Spectrum {
                magnitudes: Vec::new(),
                frequencies: Vec::new(),
            };
        }

        let scale = 2.0 / n as f64;
        let magnitudes = self.output.iter().map(|c| c.norm() * scale).collect();

        let bin_width = 1.0 / (n as f64 * (1.0 / self.sample_rate));
        let frequencies = (0..self.output.len()).map(|k| k as f64 * bin_width).collect();

        Spectrum {
            magnitudes,
            frequencies,
        }
    }

    /// One raw level per band for a block.
    pub fn band_values(&mut self, samples: &[f32], bands: &BandTable) -> Vec<i32> {
        let spectrum = self.spectrum(samples).halved();
        bands
            .iter()
            .map(|band| band_value(&spectrum, band, &self.calibration))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sine(freq: f64, amplitude: f64, sample_rate: f64, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (amplitude * (2.0 * PI * freq * i as f64 / sample_rate).sin()) as f32)
            .collect()
    }

    #[test]
    fn spectrum_has_n_over_2_plus_1_bins() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0, Calibration::default());
        let spectrum = analyzer.spectrum(&vec![0.0; 2400]);
        assert_eq!(spectrum.len(), 1201);
        assert_relative_eq!(spectrum.frequencies[1], 20.0, epsilon = 1e-9);
        assert_relative_eq!(spectrum.frequencies[1200], 24000.0, epsilon = 1e-6);
    }

    #[test]
    fn halving_keeps_first_half() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0, Calibration::default());
        let spectrum = analyzer.spectrum(&vec![0.0; 2400]).halved();
        assert_eq!(spectrum.len(), 600);
        assert_eq!(spectrum.frequencies.len(), 600);
        assert_relative_eq!(spectrum.frequency_step().unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn sine_amplitude_scaled_by_two_over_n() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0, Calibration::default());
        // 1000 Hz falls exactly on bin 50 with 20 Hz bins
        let spectrum = analyzer.spectrum(&sine(1000.0, 0.5, 48000.0, 2400));
        assert_relative_eq!(spectrum.magnitudes[50], 0.5, epsilon = 1e-4);
        assert!(spectrum.magnitudes[10] < 1e-4);
    }

    #[test]
    fn silence_reads_floor_for_every_band() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0, Calibration::default());
        let values = analyzer.band_values(&vec![0.0; 2400], &BandTable::default());
        assert_eq!(values.len(), 27);
        assert!(values.iter().all(|&v| v == 1));
    }

    #[test]
    fn band_above_nyquist_is_floor() {
        let mut analyzer = SpectrumAnalyzer::new(8000.0, Calibration::default());
        let bands = BandTable::from_pairs(&[(5000.0, 7000.0)]);
        let values = analyzer.band_values(&sine(3000.0, 0.9, 8000.0, 400), &bands);
        assert_eq!(values, vec![1]);
    }

    #[test]
    fn empty_and_inverted_ranges_are_floor() {
        let spectrum = Spectrum {
            magnitudes: vec![1.0; 10],
            frequencies: (0..10).map(|k| k as f64 * 10.0).collect(),
        };
        let calibration = Calibration::default();
        // both edges in the same bin
        assert_eq!(band_value(&spectrum, &Band::new(11.0, 19.0), &calibration), 1);
        assert_eq!(band_value(&spectrum, &Band::new(50.0, 20.0), &calibration), 1);
        assert_eq!(band_value(&spectrum, &Band::new(100.0, 200.0), &calibration), 1);
    }

    #[test]
    fn range_past_end_keeps_in_range_part() {
        let spectrum = Spectrum {
            magnitudes: vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.25, 0.5],
            frequencies: (0..10).map(|k| k as f64 * 10.0).collect(),
        };
        let value = band_value(&spectrum, &Band::new(80.0, 500.0), &Calibration::default());
        assert_eq!(value, 501);
    }

    #[test]
    fn value_truncates_before_adding_floor() {
        let spectrum = Spectrum {
            magnitudes: vec![0.0, 0.0123456, 0.0099],
            frequencies: vec![0.0, 10.0, 20.0],
        };
        let value = band_value(&spectrum, &Band::new(10.0, 30.0), &Calibration::default());
        assert_eq!(value, 13);
    }

    #[test]
    fn single_bin_spectrum_is_degenerate() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0, Calibration::default());
        let bands = BandTable::default();
        assert!(analyzer.band_values(&[0.7, -0.7], &bands).iter().all(|&v| v == 1));
        assert!(analyzer.band_values(&[], &bands).iter().all(|&v| v == 1));
    }

    #[test]
    fn non_finite_samples_read_floor() {
        let mut analyzer = SpectrumAnalyzer::new(48000.0, Calibration::default());
        let bands = BandTable::default();
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let mut block = sine(1000.0, 0.5, 48000.0, 2400);
            block[100] = bad;
            let values = analyzer.band_values(&block, &bands);
            assert!(values.iter().all(|&v| v == 1), "{}: {:?}", bad, values);
        }
    }

    #[test]
    fn non_finite_magnitude_reads_floor() {
        let spectrum = Spectrum {
            magnitudes: vec![0.0, f64::NAN, f64::INFINITY],
            frequencies: vec![0.0, 10.0, 20.0],
        };
        let calibration = Calibration::default();
        assert_eq!(band_value(&spectrum, &Band::new(10.0, 20.0), &calibration), 1);
        assert_eq!(band_value(&spectrum, &Band::new(20.0, 30.0), &calibration), 1);
    }

    #[test]
    fn plan_follows_block_length() {
        let mut analyzer = SpectrumAnalyzer::new(1000.0, Calibration::default());
        assert_eq!(analyzer.spectrum(&vec![0.0; 64]).len(), 33);
        assert_eq!(analyzer.spectrum(&vec![0.0; 101]).len(), 51);
        assert_eq!(analyzer.spectrum(&vec![0.0; 64]).len(), 33);
    }
}
