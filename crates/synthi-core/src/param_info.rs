//! Static descriptions of kernel controls.
//!
//! Kernels read their controls positionally from the host's parameter list.
//! Each kernel publishes a `&'static [ParamSpec]` whose order is that
//! position, so hosts, the CLI and tests can discover names, ranges and
//! defaults without hard-coding them.

/// Unit of a control value, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Hertz.
    Hertz,
    /// Cents (1/100 semitone).
    Cents,
    /// Volts.
    Volts,
    /// Dial position on the panel scale.
    Dial,
    /// Dimensionless (ratio, position, level).
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use synthi_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Hertz => " Hz",
            ParamUnit::Cents => " ct",
            ParamUnit::Volts => " V",
            ParamUnit::Dial => "",
            ParamUnit::None => "",
        }
    }
}

/// Description of one positional control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Full name for display (e.g., "Pulse Width").
    pub name: &'static str,
    /// Stable lowercase identifier (e.g., "pulse_width").
    pub id: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Lowest meaningful value; lower input is clamped.
    pub min: f32,
    /// Highest meaningful value; higher input is clamped.
    pub max: f32,
    /// Value used when the host supplies nothing.
    pub default: f32,
}

impl ParamSpec {
    /// Construct a spec.
    pub const fn new(
        name: &'static str,
        id: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            id,
            unit,
            min,
            max,
            default,
        }
    }

    /// Clamp `value` into `[min, max]`. NaN and infinities read as `default`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

/// Find the position of a control by its identifier.
pub fn position_of(specs: &[ParamSpec], id: &str) -> Option<usize> {
    specs.iter().position(|s| s.id == id)
}
