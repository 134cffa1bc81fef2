//! The configuration file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::validation::{ValidationResult, validate_config};
use synthi_core::WindowSize;
use synthi_kernels::{NoiseTuning, OscillatorTuning, OutputStageTuning};
use synthi_registry::KernelTuning;

/// Construction-time constants for every kernel, plus render settings.
///
/// Every field has a default, so a file only needs the values it changes.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// block_size = 128
///
/// [oscillator]
/// sine_purity = 0.7
///
/// [noise]
/// seed = 42
///
/// [output_stage]
/// resistance = 4700.0
/// capacitance = 1e-8
///
/// [output_stage.vca]
/// db_per_volt = 10.0
///
/// [scope]
/// window = 2048
/// trigger_level = 0.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthConfig {
    /// Render sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per block ("quantum").
    pub block_size: usize,
    /// Oscillator sine shaping.
    pub oscillator: OscillatorTuning,
    /// Noise colour network and seed.
    pub noise: NoiseTuning,
    /// Output tone network and VCA law.
    pub output_stage: OutputStageTuning,
    /// Scope defaults.
    pub scope: ScopeSettings,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 128,
            oscillator: OscillatorTuning::default(),
            noise: NoiseTuning::default(),
            output_stage: OutputStageTuning::default(),
            scope: ScopeSettings::default(),
        }
    }
}

/// Initial trigger-capture settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScopeSettings {
    /// Window length in samples (512, 1024, 2048 or 4096).
    pub window: usize,
    /// Rising-edge trigger level.
    pub trigger_level: f32,
    /// Whether frames are aligned to trigger edges.
    pub trigger_enabled: bool,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            window: WindowSize::default().samples(),
            trigger_level: 0.0,
            trigger_enabled: true,
        }
    }
}

impl SynthConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: SynthConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a TOML file, creating the parent directory if needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Render as pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field; see [`validate_config`].
    pub fn validate(&self) -> ValidationResult<()> {
        validate_config(self)
    }

    /// Sample rate as the kernels take it.
    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate as f32
    }

    /// The scope window, falling back to the default for unsupported sizes.
    pub fn scope_window(&self) -> WindowSize {
        WindowSize::try_from(self.scope.window).unwrap_or_default()
    }

    /// Tuning handed to [`KernelRegistry::create`](synthi_registry::KernelRegistry::create).
    pub fn kernel_tuning(&self) -> KernelTuning {
        KernelTuning {
            oscillator: self.oscillator,
            noise: self.noise,
            output_stage: self.output_stage,
            scope_window: self.scope_window(),
        }
    }
}
