//! Range checks for a parsed [`SynthConfig`].
//!
//! Kernels clamp everything they are handed, so an out-of-range constant never
//! breaks the render thread. It does silently produce the wrong instrument,
//! which is why the configuration layer rejects such values up front and
//! reports every offending field at once.
//!
//! ```rust
//! use synthi_config::{SynthConfig, ValidationError};
//!
//! let mut config = SynthConfig::default();
//! config.output_stage.resistance = -1.0;
//! config.scope.window = 1000;
//!
//! match config.validate() {
//!     Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
//!     other => panic!("expected two errors, got {other:?}"),
//! }
//! ```

use crate::SynthConfig;
use synthi_core::WindowSize;
use thiserror::Error;

/// Largest accepted render block.
pub const MAX_BLOCK_SIZE: usize = 4096;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value must be strictly positive.
    #[error("'{field}' must be positive, got {value}")]
    NotPositive {
        /// Dotted field path.
        field: String,
        /// Offending value.
        value: f64,
    },

    /// Value outside its closed range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted field path.
        field: String,
        /// Offending value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// NaN or infinite.
    #[error("'{field}' must be finite")]
    NotFinite {
        /// Dotted field path.
        field: String,
    },

    /// Scope window other than 512/1024/2048/4096.
    #[error("scope window {0} is not one of 512, 1024, 2048, 4096")]
    UnsupportedWindow(usize),

    /// Two fields that must be ordered are not.
    #[error("'{low}' must be below '{high}'")]
    Misordered {
        /// Field that should be smaller.
        low: String,
        /// Field that should be larger.
        high: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", join_errors(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Default)]
struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    fn finite(&mut self, field: &str, value: f32) -> bool {
        if value.is_finite() {
            true
        } else {
            self.errors.push(ValidationError::NotFinite { field: field.into() });
            false
        }
    }

    fn positive(&mut self, field: &str, value: f32) {
        if self.finite(field, value) && value <= 0.0 {
            self.errors.push(ValidationError::NotPositive {
                field: field.into(),
                value: f64::from(value),
            });
        }
    }

    fn range(&mut self, field: &str, value: f32, min: f32, max: f32) {
        if self.finite(field, value) && !(min..=max).contains(&value) {
            self.errors.push(ValidationError::OutOfRange {
                field: field.into(),
                value: f64::from(value),
                min: f64::from(min),
                max: f64::from(max),
            });
        }
    }

    fn below(&mut self, low: (&str, f32), high: (&str, f32)) {
        if self.finite(low.0, low.1) && self.finite(high.0, high.1) && low.1 >= high.1 {
            self.errors.push(ValidationError::Misordered {
                low: low.0.into(),
                high: high.0.into(),
            });
        }
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}

/// Check every field of `config`.
pub fn validate_config(config: &SynthConfig) -> ValidationResult<()> {
    let mut c = Checker::default();

    if config.sample_rate == 0 {
        c.errors.push(ValidationError::NotPositive {
            field: "sample_rate".into(),
            value: 0.0,
        });
    }
    if !(1..=MAX_BLOCK_SIZE).contains(&config.block_size) {
        c.errors.push(ValidationError::OutOfRange {
            field: "block_size".into(),
            value: config.block_size as f64,
            min: 1.0,
            max: MAX_BLOCK_SIZE as f64,
        });
    }

    let osc = &config.oscillator;
    c.positive("oscillator.saturation", osc.saturation);
    c.range("oscillator.max_offset", osc.max_offset, 0.0, 0.99);
    c.range("oscillator.sine_purity", osc.sine_purity, 0.0, 1.0);
    c.range("oscillator.extreme_attenuation", osc.extreme_attenuation, 0.0, 1.0);

    let noise = &config.noise;
    c.positive("noise.resistance", noise.resistance);
    c.positive("noise.capacitance", noise.capacitance);
    c.range("noise.bypass_epsilon", noise.bypass_epsilon, 0.0, 0.5);

    let out = &config.output_stage;
    c.positive("output_stage.resistance", out.resistance);
    c.positive("output_stage.capacitance", out.capacitance);
    c.range("output_stage.bypass_epsilon", out.bypass_epsilon, 0.0, 0.5);
    c.positive("output_stage.vca.db_per_volt", out.vca.db_per_volt);
    c.below(
        ("output_stage.vca.dial_min_volts", out.vca.dial_min_volts),
        ("output_stage.vca.dial_max_volts", out.vca.dial_max_volts),
    );
    c.range("output_stage.vca.floor_db", out.vca.floor_db, -200.0, -20.0);
    c.finite("output_stage.vca.saturation_threshold", out.vca.saturation_threshold);
    c.positive("output_stage.vca.saturation_limit", out.vca.saturation_limit);
    c.range("output_stage.vca.softness", out.vca.softness, 0.0, 100.0);

    if WindowSize::try_from(config.scope.window).is_err() {
        c.errors.push(ValidationError::UnsupportedWindow(config.scope.window));
    }
    c.finite("scope.trigger_level", config.scope.trigger_level);

    c.finish()
}
