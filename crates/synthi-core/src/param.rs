//! Per-block control values.
//!
//! A host hands every kernel one value slice per named control. A slice of
//! length 1 means the control is constant for the whole block ("block-rate");
//! a longer slice carries one value per sample ("sample-rate"), typically
//! because another kernel's output is modulating the control.
//!
//! [`ParamBlock`] captures that distinction once, at the block boundary, so
//! kernels can hoist all derived quantities out of the sample loop when every
//! control they read is constant.
//!
//! ```rust
//! use synthi_core::ParamBlock;
//!
//! let constant = ParamBlock::from_slice(&[440.0], 0.0);
//! assert!(constant.is_constant());
//! assert_eq!(constant.at(100), 440.0);
//!
//! let ramp = [0.0, 0.25, 0.5];
//! let curve = ParamBlock::from_slice(&ramp, 0.0);
//! assert_eq!(curve.at(1), 0.25);
//! // Reads past the provided curve hold its last value.
//! assert_eq!(curve.at(10), 0.5);
//! ```

/// Values of one control for one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamBlock<'a> {
    /// Same value for every sample of the block.
    Constant(f32),
    /// One value per sample.
    PerSample(&'a [f32]),
}

impl<'a> ParamBlock<'a> {
    /// Classify a host-provided slice.
    ///
    /// An empty slice yields `default`; a single value is block-rate.
    #[inline]
    pub fn from_slice(values: &'a [f32], default: f32) -> Self {
        match values {
            [] => Self::Constant(default),
            [v] => Self::Constant(*v),
            _ => Self::PerSample(values),
        }
    }

    /// Whether the control is block-rate.
    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }

    /// Value at sample `index`.
    ///
    /// Never reads past the provided slice: indices beyond a per-sample curve
    /// return its last value.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        match *self {
            Self::Constant(v) => v,
            Self::PerSample(values) => match values.get(index) {
                Some(v) => *v,
                None => values.last().copied().unwrap_or(0.0),
            },
        }
    }

    /// First value of the block.
    #[inline]
    pub fn first(&self) -> f32 {
        self.at(0)
    }
}

impl Default for ParamBlock<'_> {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

/// Fetch control `index` from a host parameter list, falling back to `default`
/// when the host supplied fewer controls.
#[inline]
pub fn param_or<'a>(params: &[ParamBlock<'a>], index: usize, default: f32) -> ParamBlock<'a> {
    params
        .get(index)
        .copied()
        .unwrap_or(ParamBlock::Constant(default))
}

/// True when every control in the list is block-rate.
#[inline]
pub fn all_constant(params: &[ParamBlock<'_>]) -> bool {
    params.iter().all(ParamBlock::is_constant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_uses_default() {
        let block = ParamBlock::from_slice(&[], 0.7);
        assert_eq!(block, ParamBlock::Constant(0.7));
    }

    #[test]
    fn single_value_is_constant() {
        let block = ParamBlock::from_slice(&[3.0], 0.0);
        assert!(block.is_constant());
        assert_eq!(block.at(0), 3.0);
        assert_eq!(block.at(127), 3.0);
    }

    #[test]
    fn per_sample_reads_in_order() {
        let values = [1.0, 2.0, 3.0, 4.0];
        let block = ParamBlock::from_slice(&values, 0.0);
        assert!(!block.is_constant());
        for (i, v) in values.iter().enumerate() {
            assert_eq!(block.at(i), *v);
        }
        assert_eq!(block.first(), 1.0);
    }

    #[test]
    fn short_curve_holds_last_value() {
        let values = [1.0, 2.0];
        let block = ParamBlock::from_slice(&values, 0.0);
        assert_eq!(block.at(2), 2.0);
        assert_eq!(block.at(1000), 2.0);
    }

    #[test]
    fn param_or_falls_back() {
        let params = [ParamBlock::Constant(1.0)];
        assert_eq!(param_or(&params, 0, 9.0), ParamBlock::Constant(1.0));
        assert_eq!(param_or(&params, 3, 9.0), ParamBlock::Constant(9.0));
    }

    #[test]
    fn all_constant_detects_curves() {
        let curve = [0.0, 1.0];
        assert!(all_constant(&[ParamBlock::Constant(1.0), ParamBlock::Constant(2.0)]));
        assert!(!all_constant(&[
            ParamBlock::Constant(1.0),
            ParamBlock::PerSample(&curve)
        ]));
        assert!(all_constant(&[]));
    }
}
