//! Averaged spectra and band energy

use crate::fft::{Fft, Window, bin_width};
use synthi_core::linear_to_db;

/// Averaged power spectrum (Welch, 50 % overlap)
///
/// Returns `fft_size/2 + 1` mean power values. Signals shorter than one frame
/// are zero-padded into a single frame.
pub fn average_power(signal: &[f32], fft_size: usize, window: Window) -> Vec<f32> {
    let fft = Fft::new(fft_size);
    let hop = (fft_size / 2).max(1);
    let mut acc = vec![0.0f32; fft_size / 2 + 1];
    let mut frames = 0usize;

    let mut start = 0;
    loop {
        let end = (start + fft_size).min(signal.len());
        let mags = fft.magnitudes(&signal[start..end], window);
        for (a, m) in acc.iter_mut().zip(&mags) {
            *a += m * m;
        }
        frames += 1;
        if start + fft_size >= signal.len() {
            break;
        }
        start += hop;
    }

    let norm = 1.0 / frames as f32;
    acc.iter_mut().for_each(|a| *a *= norm);
    acc
}

/// Total power between `low_hz` and `high_hz` (inclusive), in dB
///
/// ```rust
/// use synthi_analysis::spectrum::band_energy_db;
///
/// let tone: Vec<f32> = (0..8192)
///     .map(|i| (std::f32::consts::TAU * 1000.0 * i as f32 / 48000.0).sin())
///     .collect();
/// let low = band_energy_db(&tone, 48000.0, 2048, 500.0, 2000.0);
/// let high = band_energy_db(&tone, 48000.0, 2048, 10000.0, 24000.0);
/// assert!(low - high > 60.0);
/// ```
pub fn band_energy_db(
    signal: &[f32],
    sample_rate: f32,
    fft_size: usize,
    low_hz: f32,
    high_hz: f32,
) -> f32 {
    let power = average_power(signal, fft_size, Window::Hann);
    let width = bin_width(sample_rate, fft_size);
    let energy: f32 = power
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let f = *i as f32 * width;
            f >= low_hz && f <= high_hz
        })
        .map(|(_, p)| p)
        .sum();
    // Power to amplitude dB
    linear_to_db(energy.sqrt().max(1e-10))
}

/// Frequency of the strongest bin above DC
pub fn dominant_frequency(signal: &[f32], sample_rate: f32, fft_size: usize) -> f32 {
    let power = average_power(signal, fft_size, Window::Hann);
    let (bin, _) = power
        .iter()
        .enumerate()
        .skip(1)
        .fold((0, 0.0f32), |best, (i, &p)| if p > best.1 { (i, p) } else { best });
    bin as f32 * bin_width(sample_rate, fft_size)
}
