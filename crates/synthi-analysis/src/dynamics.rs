//! Level measurements

use synthi_core::linear_to_db;

/// RMS level (linear)
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = signal.iter().map(|&x| x * x).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// RMS level in dB (−200 for silence)
pub fn rms_db(signal: &[f32]) -> f32 {
    linear_to_db(rms(signal))
}

/// Largest absolute sample
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().fold(0.0f32, |m, x| m.max(x.abs()))
}

/// Peak level in dB (−200 for silence)
pub fn peak_db(signal: &[f32]) -> f32 {
    linear_to_db(peak(signal))
}

/// Mean value
pub fn dc_offset(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().sum::<f32>() / signal.len() as f32
}

/// Peak-to-RMS ratio (≈1.414 for a sine)
pub fn crest_factor(signal: &[f32]) -> f32 {
    let r = rms(signal);
    if r > 1e-10 { peak(signal) / r } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn sine_levels() {
        let sine: Vec<f32> = (0..48000).map(|i| (TAU * 100.0 * i as f32 / 48000.0).sin()).collect();
        assert!((rms(&sine) - 0.7071).abs() < 0.001);
        assert!((peak(&sine) - 1.0).abs() < 1e-3);
        assert!((crest_factor(&sine) - 1.414).abs() < 0.01);
        assert!(dc_offset(&sine).abs() < 1e-3);
    }

    #[test]
    fn silence_levels() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(peak(&[0.0; 8]), 0.0);
        assert!(peak_db(&[0.0; 8]) < -190.0);
        assert_eq!(crest_factor(&[0.0; 8]), 0.0);
    }
}
