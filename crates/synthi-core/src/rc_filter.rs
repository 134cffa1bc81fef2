//! Bipolar RC tone section (bilinear one-pole).
//!
//! Models a passive RC voltage divider followed by a unity-gain buffer, whose
//! wiper position blends between a low-pass and a high-frequency shelf. The
//! analog prototype is mapped to discrete time with the bilinear transform,
//! giving a one-pole/one-zero section whose pole is fixed by the circuit
//! constants and whose zero moves with the position control:
//!
//! ```text
//! K    = 2 · fs · τ            τ = R · C
//! a1   = (2 − K) / (2 + K)
//! Kinv = K / (2 + K)
//! δ    = p · Kinv
//! b0   = 1 + δ
//! b1   = a1 − δ
//! y[n] = b0·x[n] + b1·x[n−1] − a1·y[n−1]
//! ```
//!
//! | Position | Response |
//! |----------|----------|
//! | −1 | Low-pass, −3 dB at `(fs/π)·atan(1/(fs·τ))`, about `1/(πτ)` well below Nyquist |
//! | 0  | Identity (`b0 = 1`, `b1 = a1`) |
//! | +1 | High shelf, +6 dB at Nyquist |
//!
//! DC gain is `(b0 + b1)/(1 + a1) = 1` for every position, so the +1 end is a
//! shelf and never a true high-pass.
//!
//! # Usage
//!
//! ```rust
//! use synthi_core::RcToneFilter;
//!
//! let mut tone = RcToneFilter::new(48000.0, 10_000.0 * 33e-9);
//! // Neutral position passes the signal through unchanged
//! let y = tone.process(0.5, 0.0);
//! assert!((y - 0.5).abs() < 1e-6);
//! ```

use crate::flush_denormal;

/// One-pole bilinear RC section with a bipolar position control.
///
/// # Invariants
///
/// - `a1` and `k_inv` depend only on sample rate and τ, and are computed once
/// - State is flushed with [`flush`](Self::flush) once per block
/// - [`bypass_sample`](Self::bypass_sample) keeps the history equal to what the
///   identity response would hold, so leaving a bypass is seamless
#[derive(Debug, Clone)]
pub struct RcToneFilter {
    x1: f32,
    y1: f32,
    a1: f32,
    k_inv: f32,
    sample_rate: f32,
    tau: f32,
}

impl RcToneFilter {
    /// Create a section for the given sample rate and time constant τ = R·C (seconds).
    pub fn new(sample_rate: f32, tau: f32) -> Self {
        let mut filter = Self {
            x1: 0.0,
            y1: 0.0,
            a1: 0.0,
            k_inv: 0.0,
            sample_rate,
            tau,
        };
        filter.recalculate();
        filter
    }

    /// Create a section from resistor (Ω) and capacitor (F) values.
    pub fn from_components(sample_rate: f32, resistance: f32, capacitance: f32) -> Self {
        Self::new(sample_rate, resistance * capacitance)
    }

    /// Process one sample at position `position`.
    ///
    /// The position is clamped to \[-1, 1\]; a non-finite position reads as
    /// the neutral 0.
    #[inline]
    pub fn process(&mut self, input: f32, position: f32) -> f32 {
        let (b0, b1) = self.coefficients(sanitize_position(position));
        self.process_with(input, b0, b1)
    }

    /// Feed-forward coefficients `(b0, b1)` for a position.
    ///
    /// Callers with a block-rate position compute these once and use
    /// [`process_with`](Self::process_with) in the sample loop.
    #[inline]
    pub fn coefficients(&self, position: f32) -> (f32, f32) {
        let delta = position * self.k_inv;
        (1.0 + delta, self.a1 - delta)
    }

    /// Process one sample with precomputed feed-forward coefficients.
    #[inline]
    pub fn process_with(&mut self, input: f32, b0: f32, b1: f32) -> f32 {
        let y = b0 * input + b1 * self.x1 - self.a1 * self.y1;
        self.x1 = input;
        self.y1 = y;
        y
    }

    /// Pass a sample through untouched while tracking identity-response state.
    #[inline]
    pub fn bypass_sample(&mut self, input: f32) -> f32 {
        self.x1 = input;
        self.y1 = input;
        input
    }

    /// Flush denormal history to zero. Call once per block.
    #[inline]
    pub fn flush(&mut self) {
        self.x1 = flush_denormal(self.x1);
        self.y1 = flush_denormal(self.y1);
    }

    /// Zero the filter history.
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.y1 = 0.0;
    }

    /// Current `(x1, y1)` history.
    pub fn state(&self) -> (f32, f32) {
        (self.x1, self.y1)
    }

    /// Update sample rate and recompute the fixed coefficients.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate();
    }

    /// Frequency in Hz where the low-pass end (position −1) is 3 dB down.
    ///
    /// The −1 response is the bilinear image of `1/(1 + sτ/2)`, so the analog
    /// corner `1/(πτ)` is warped to `(fs/π)·atan((1 + a1)/(1 − a1))`.
    pub fn corner_hz(&self) -> f32 {
        let ratio = (1.0 + self.a1) / (1.0 - self.a1);
        self.sample_rate / core::f32::consts::PI * libm::atanf(ratio)
    }

    /// Pole coefficient `a1`.
    pub fn a1(&self) -> f32 {
        self.a1
    }

    fn recalculate(&mut self) {
        let k = 2.0 * self.sample_rate * self.tau;
        self.a1 = (2.0 - k) / (2.0 + k);
        self.k_inv = k / (2.0 + k);
    }
}

/// Clamp a position into \[-1, 1\], mapping NaN and infinities to 0.
#[inline]
fn sanitize_position(position: f32) -> f32 {
    if position.is_finite() {
        position.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
