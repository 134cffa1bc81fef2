//! Exponential VCA law with mechanical cutoff and positive-CV saturation.
//!
//! The level dial spans a control-voltage range (−12 V at 0, 0 V at 10);
//! external CV sums in and the total maps to gain at a fixed dB per volt.
//! Dial position 0 opens a switch on the panel, so it mutes regardless of CV.
//!
//! ```text
//! V    = Vmin + (dial/10)·(Vmax − Vmin) + cv
//! V'   = V                                  (V ≤ threshold)
//!        threshold + W·r/(1 + r·softness)   (r = (V − threshold)/W)
//! gain = 10^(V'·dB/V / 20), 0 below floor
//! ```

use synthi_core::db_to_linear;

/// Maximum dial position.
pub const DIAL_MAX: f32 = 10.0;

/// VCA transfer constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VcaLaw {
    /// Gain slope in dB per volt.
    pub db_per_volt: f32,
    /// Control voltage at dial 0.
    pub dial_min_volts: f32,
    /// Control voltage at dial 10.
    pub dial_max_volts: f32,
    /// Gains below this level (dB) are exactly zero.
    pub floor_db: f32,
    /// Voltage above which positive CV starts to compress.
    pub saturation_threshold: f32,
    /// Asymptotic width `W` of the compression region in volts. Zero disables it.
    pub saturation_limit: f32,
    /// Compression softness.
    pub softness: f32,
}

impl Default for VcaLaw {
    fn default() -> Self {
        Self {
            db_per_volt: 10.0,
            dial_min_volts: -12.0,
            dial_max_volts: 0.0,
            floor_db: -120.0,
            saturation_threshold: 0.0,
            saturation_limit: 3.0,
            softness: 2.0,
        }
    }
}

impl VcaLaw {
    /// Control voltage contributed by a dial position (clamped to \[0, 10\]).
    #[inline]
    pub fn dial_to_volts(&self, dial: f32) -> f32 {
        let d = dial.clamp(0.0, DIAL_MAX);
        self.dial_min_volts + (d / DIAL_MAX) * (self.dial_max_volts - self.dial_min_volts)
    }

    /// Apply the positive-voltage compression curve.
    #[inline]
    pub fn saturate(&self, volts: f32) -> f32 {
        let excess = volts - self.saturation_threshold;
        if excess <= 0.0 || self.saturation_limit <= 0.0 {
            return volts;
        }
        let r = excess / self.saturation_limit;
        self.saturation_threshold + self.saturation_limit * r / (1.0 + r * self.softness)
    }

    /// Linear gain for a dial position and external control voltage.
    ///
    /// Dial ≤ 0 (or NaN) returns exactly 0.0 before any voltage is computed.
    /// Non-finite CV reads as 0 V.
    #[inline]
    pub fn gain(&self, dial: f32, cv: f32) -> f32 {
        if dial.is_nan() || dial <= 0.0 {
            return 0.0;
        }
        let cv = if cv.is_finite() { cv } else { 0.0 };
        let volts = self.saturate(self.dial_to_volts(dial) + cv);
        let db = volts * self.db_per_volt;
        if db < self.floor_db {
            0.0
        } else {
            db_to_linear(db)
        }
    }

    /// Gain ratio of one volt step.
    pub fn ratio_per_volt(&self) -> f32 {
        db_to_linear(self.db_per_volt)
    }
}
