//! Total harmonic distortion measurement
//!
//! A Blackman-Harris windowed FFT is read at each harmonic of a known (or
//! detected) fundamental; THD is the RMS sum of harmonics 2..=H over the
//! fundamental amplitude.

use crate::fft::{Fft, Window, bin_width};
use synthi_core::linear_to_db;

/// Result of a THD measurement
#[derive(Debug, Clone)]
pub struct ThdResult {
    /// Fundamental frequency used (Hz)
    pub fundamental_freq: f32,
    /// Fundamental amplitude (linear, 1.0 = full-scale sine)
    pub fundamental_amplitude: f32,
    /// THD as a ratio
    pub thd_ratio: f32,
    /// THD in dB
    pub thd_db: f32,
    /// Harmonic amplitudes, fundamental first
    pub harmonics: Vec<f32>,
}

impl ThdResult {
    /// THD in percent
    pub fn thd_percent(&self) -> f32 {
        self.thd_ratio * 100.0
    }
}

/// THD analyzer
pub struct ThdAnalyzer {
    sample_rate: f32,
    fft_size: usize,
    max_harmonics: usize,
}

impl ThdAnalyzer {
    /// Create an analyzer
    ///
    /// # Arguments
    /// * `sample_rate` - Sample rate in Hz
    /// * `fft_size` - FFT size; the signal should be at least this long
    pub fn new(sample_rate: f32, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
            max_harmonics: 10,
        }
    }

    /// Number of harmonics (including the fundamental) to read
    pub fn with_max_harmonics(mut self, max: usize) -> Self {
        self.max_harmonics = max.max(2);
        self
    }

    /// Measure THD with a known fundamental
    pub fn analyze(&self, signal: &[f32], fundamental_freq: f32) -> ThdResult {
        let fft = Fft::new(self.fft_size);
        let magnitudes = fft.magnitudes(signal, Window::BlackmanHarris);
        self.from_magnitudes(&magnitudes, fundamental_freq)
    }

    /// Measure THD, taking the strongest bin as the fundamental
    pub fn analyze_auto(&self, signal: &[f32]) -> ThdResult {
        let fft = Fft::new(self.fft_size);
        let magnitudes = fft.magnitudes(signal, Window::BlackmanHarris);
        let bin = magnitudes
            .iter()
            .enumerate()
            .skip(1)
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best })
            .0;
        let fundamental = bin as f32 * bin_width(self.sample_rate, self.fft_size);
        self.from_magnitudes(&magnitudes, fundamental)
    }

    fn from_magnitudes(&self, magnitudes: &[f32], fundamental_freq: f32) -> ThdResult {
        let width = bin_width(self.sample_rate, self.fft_size);
        let nyquist = self.sample_rate / 2.0;

        let harmonics: Vec<f32> = (1..=self.max_harmonics)
            .map(|h| fundamental_freq * h as f32)
            .take_while(|&f| f > 0.0 && f < nyquist)
            .map(|f| harmonic_amplitude(magnitudes, f / width))
            .collect();

        let fundamental_amplitude = harmonics.first().copied().unwrap_or(0.0);
        let harmonic_power: f32 = harmonics.iter().skip(1).map(|h| h * h).sum();
        let thd_ratio = harmonic_power.sqrt() / fundamental_amplitude.max(1e-10);

        ThdResult {
            fundamental_freq,
            fundamental_amplitude,
            thd_ratio,
            thd_db: linear_to_db(thd_ratio),
            harmonics,
        }
    }
}

/// Peak magnitude within ±2 bins of a fractional bin position
///
/// The Blackman-Harris main lobe is 8 bins wide, so a small search catches
/// harmonics that fall between bins.
fn harmonic_amplitude(magnitudes: &[f32], bin: f32) -> f32 {
    let centre = bin.round() as usize;
    let lo = centre.saturating_sub(2);
    let hi = (centre + 2).min(magnitudes.len().saturating_sub(1));
    magnitudes
        .get(lo..=hi)
        .map_or(0.0, |s| s.iter().copied().fold(0.0, f32::max))
}

/// Sine test tone
pub fn generate_test_tone(
    sample_rate: f32,
    frequency: f32,
    duration_secs: f32,
    amplitude: f32,
) -> Vec<f32> {
    let n = (duration_secs * sample_rate) as usize;
    (0..n)
        .map(|i| amplitude * (std::f32::consts::TAU * frequency * i as f32 / sample_rate).sin())
        .collect()
}
