//! Configuration for the synthi kernels.
//!
//! Every numeric constant a kernel takes at construction (RC component
//! values, VCA law, sine shaping, noise seed) plus render settings lives in a
//! single [`SynthConfig`], loaded from TOML and validated once before any
//! kernel is built.
//!
//! # Example
//!
//! ```rust,no_run
//! use synthi_config::SynthConfig;
//! use synthi_core::KernelKind;
//! use synthi_registry::KernelRegistry;
//!
//! let config = SynthConfig::load("synthi.toml").unwrap();
//! let registry = KernelRegistry::new();
//! let stage = registry
//!     .create(KernelKind::OutputStage, config.sample_rate_hz(), &config.kernel_tuning())
//!     .unwrap();
//! ```

mod error;
mod synth_config;

/// Range checks.
pub mod validation;

pub use error::ConfigError;
pub use synth_config::{ScopeSettings, SynthConfig};
pub use validation::{MAX_BLOCK_SIZE, ValidationError, ValidationResult, validate_config};
