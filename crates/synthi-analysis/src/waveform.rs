//! Time-domain waveform landmarks: edges, wraps, periods

/// Indices `i` where `signal[i-1] < level <= signal[i]`
pub fn rising_crossings(signal: &[f32], level: f32) -> Vec<usize> {
    signal
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] < level && level <= w[1])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Indices `i` where the signal falls by more than `threshold` in one sample
///
/// Locates the reset of a sawtooth.
pub fn falling_jumps(signal: &[f32], threshold: f32) -> Vec<usize> {
    signal
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] - w[1] > threshold)
        .map(|(i, _)| i + 1)
        .collect()
}

/// Indices of strict local maxima above `min_level`
pub fn local_maxima(signal: &[f32], min_level: f32) -> Vec<usize> {
    signal
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > min_level && w[1] >= w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Frequency estimated from the mean spacing of rising zero crossings
///
/// Returns `None` with fewer than two crossings.
pub fn estimate_frequency(signal: &[f32], sample_rate: f32) -> Option<f32> {
    let crossings = rising_crossings(signal, 0.0);
    let (first, last) = (crossings.first()?, crossings.last()?);
    if crossings.len() < 2 {
        return None;
    }
    let period = (last - first) as f32 / (crossings.len() - 1) as f32;
    Some(sample_rate / period)
}
