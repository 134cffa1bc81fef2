//! Mathematical utility functions for the render thread.
//!
//! Every function here is allocation-free and `no_std` compatible.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//! - [`cents_to_ratio`] - Detune in cents to a frequency multiplier
//!
//! # Stability
//!
//! - [`flush_denormal`] - Zero out values too small to matter in recursive state
//!
//! # Utilities
//!
//! - [`lerp`] - Linear interpolation
//! - [`equal_power_pan`] - Constant-power stereo gains

use core::f32::consts::FRAC_PI_4;
use libm::{cosf, exp2f, expf, logf, sinf};

/// Magnitude below which recursive filter state is treated as exact zero.
pub const DENORMAL_THRESHOLD: f32 = 1e-30;

/// Convert decibels to linear gain.
///
/// # Example
/// ```rust
/// use synthi_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// Inputs at or below zero are floored to 1e-10 (−200 dB).
///
/// # Example
/// ```rust
/// use synthi_core::linear_to_db;
///
/// assert!((linear_to_db(1.0) - 0.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert a detune amount in cents to a frequency ratio (`2^(cents/1200)`).
///
/// ```rust
/// use synthi_core::cents_to_ratio;
///
/// assert!((cents_to_ratio(1200.0) - 2.0).abs() < 1e-5);
/// assert_eq!(cents_to_ratio(0.0), 1.0);
/// ```
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    exp2f(cents / 1200.0)
}

/// Linear interpolation between `a` (t = 0) and `b` (t = 1).
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Flush values too small to matter to exactly zero.
///
/// Subnormal floats cause severe slowdowns on most CPUs when they
/// circulate in a feedback path. Recursive sections call this on their
/// history once per block.
///
/// Reference: IEEE 754-2008, Section 3.4 (Subnormal numbers)
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD { 0.0 } else { x }
}

/// Equal-power pan law.
///
/// Maps `pan` in \[-1, 1\] to `(left, right)` gains with
/// `left² + right² = 1`. Out-of-range input is clamped.
///
/// ```rust
/// use synthi_core::equal_power_pan;
///
/// let (l, r) = equal_power_pan(0.0);
/// assert!((l - r).abs() < 1e-6);
/// assert!((l * l + r * r - 1.0).abs() < 1e-6);
/// ```
#[inline]
pub fn equal_power_pan(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (cosf(angle), sinf(angle))
}
