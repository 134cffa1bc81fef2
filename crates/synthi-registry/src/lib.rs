//! Kernel registry and factory for the synthi analog-chain kernels.
//!
//! Hosts build kernels through an explicit table keyed by [`KernelKind`]
//! instead of looking them up by string at runtime. Each entry carries a
//! descriptor for listings and a factory taking the sample rate and the
//! construction-time [`KernelTuning`].
//!
//! # Example
//!
//! ```rust
//! use synthi_core::{KernelKind, ParamBlock};
//! use synthi_registry::{KernelRegistry, KernelTuning};
//!
//! let registry = KernelRegistry::new();
//! let tuning = KernelTuning::default();
//!
//! for descriptor in registry.all_kernels() {
//!     println!("{}: {}", descriptor.id, descriptor.description);
//! }
//!
//! if let Some(mut osc) = registry.create(KernelKind::Oscillator, 48000.0, &tuning) {
//!     let mut out = [0.0f32; 128];
//!     osc.process(&[], &mut [&mut out], &[ParamBlock::Constant(440.0)]);
//! }
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`). Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! synthi-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, vec::Vec};

use synthi_core::{Kernel, KernelKind, ParamSpec, WindowSize, position_of};
use synthi_kernels::{
    ColourNoiseSource, NOISE_PARAMS, NoiseTuning, OSCILLATOR_PARAMS, OUTPUT_STAGE_PARAMS,
    OscillatorTuning, OutputStage, OutputStageTuning, PhaseOscillator, TriggerCapture,
};

/// Where a kernel sits in the signal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelRole {
    /// Generates signal from nothing (oscillator, noise)
    Source,
    /// Shapes an upstream signal
    Processor,
    /// Reads signals without producing audio
    Observer,
}

impl KernelRole {
    /// Returns a human-readable name for the role.
    pub const fn name(&self) -> &'static str {
        match self {
            KernelRole::Source => "Source",
            KernelRole::Processor => "Processor",
            KernelRole::Observer => "Observer",
        }
    }
}

/// Construction-time constants for every kernel kind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KernelTuning {
    /// Sine shaping constants.
    pub oscillator: OscillatorTuning,
    /// Colour network constants and seed.
    pub noise: NoiseTuning,
    /// Tone network and VCA constants.
    pub output_stage: OutputStageTuning,
    /// Initial scope window.
    pub scope_window: WindowSize,
}

/// Describes a kernel in the registry.
#[derive(Debug, Clone)]
pub struct KernelDescriptor {
    /// Kind this entry builds.
    pub kind: KernelKind,
    /// Unique identifier (same as [`KernelKind::id`]).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description.
    pub description: &'static str,
    /// Signal-flow role.
    pub role: KernelRole,
    /// Signal inputs, in order.
    pub inputs: &'static [&'static str],
    /// Outputs, in order.
    pub outputs: &'static [&'static str],
    /// Positional controls.
    pub params: &'static [ParamSpec],
}

/// Factory function type for creating kernels.
type KernelFactory = fn(f32, &KernelTuning) -> Box<dyn Kernel + Send>;

struct RegistryEntry {
    descriptor: KernelDescriptor,
    factory: KernelFactory,
}

/// Registry of all kernels.
pub struct KernelRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelRegistry {
    /// Create a registry with every kernel registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(KernelKind::ALL.len()),
        };
        registry.register_builtin_kernels();
        registry
    }

    fn register_builtin_kernels(&mut self) {
        self.register(
            KernelDescriptor {
                kind: KernelKind::Oscillator,
                id: KernelKind::Oscillator.id(),
                name: "Phase Oscillator",
                description: "Phase-coherent sine/saw/triangle/pulse with PolyBLEP and hard sync",
                role: KernelRole::Source,
                inputs: &["sync"],
                outputs: &["sine", "saw", "triangle", "pulse"],
                params: &OSCILLATOR_PARAMS,
            },
            |sr, t| Box::new(PhaseOscillator::with_tuning(sr, t.oscillator)),
        );

        self.register(
            KernelDescriptor {
                kind: KernelKind::Noise,
                id: KernelKind::Noise.id(),
                name: "Colour Noise",
                description: "White noise through the bipolar RC colour network",
                role: KernelRole::Source,
                inputs: &[],
                outputs: &["noise"],
                params: &NOISE_PARAMS,
            },
            |sr, t| Box::new(ColourNoiseSource::with_tuning(sr, t.noise)),
        );

        self.register(
            KernelDescriptor {
                kind: KernelKind::OutputStage,
                id: KernelKind::OutputStage.id(),
                name: "Output Stage",
                description: "RC tone filter, exponential VCA with hard mute, equal-power pan",
                role: KernelRole::Processor,
                inputs: &["signal", "cv"],
                outputs: &["mono", "left", "right"],
                params: &OUTPUT_STAGE_PARAMS,
            },
            |sr, t| Box::new(OutputStage::with_tuning(sr, t.output_stage)),
        );

        self.register(
            KernelDescriptor {
                kind: KernelKind::TriggerCapture,
                id: KernelKind::TriggerCapture.id(),
                name: "Trigger Capture",
                description: "Edge-triggered dual-channel capture for the oscilloscope",
                role: KernelRole::Observer,
                inputs: &["channel_a", "channel_b"],
                outputs: &[],
                params: &[],
            },
            |sr, t| Box::new(TriggerCapture::new(sr, t.scope_window)),
        );
    }

    fn register(&mut self, descriptor: KernelDescriptor, factory: KernelFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Returns descriptors for all registered kernels.
    pub fn all_kernels(&self) -> Vec<&KernelDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Returns descriptors for kernels with a given role.
    pub fn kernels_with_role(&self, role: KernelRole) -> Vec<&KernelDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.role == role)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Descriptor for a kind.
    pub fn get(&self, kind: KernelKind) -> Option<&KernelDescriptor> {
        self.entry(kind).map(|e| &e.descriptor)
    }

    /// Descriptor for an identifier such as `"oscillator"`.
    pub fn get_by_id(&self, id: &str) -> Option<&KernelDescriptor> {
        KernelKind::from_id(id).and_then(|kind| self.get(kind))
    }

    /// Build a kernel.
    ///
    /// Returns `None` only if `kind` has no entry.
    pub fn create(
        &self,
        kind: KernelKind,
        sample_rate: f32,
        tuning: &KernelTuning,
    ) -> Option<Box<dyn Kernel + Send>> {
        self.entry(kind).map(|e| (e.factory)(sample_rate, tuning))
    }

    /// Build a kernel from its identifier.
    pub fn create_by_id(
        &self,
        id: &str,
        sample_rate: f32,
        tuning: &KernelTuning,
    ) -> Option<Box<dyn Kernel + Send>> {
        KernelKind::from_id(id).and_then(|kind| self.create(kind, sample_rate, tuning))
    }

    /// Position of a control by identifier or display name (case-insensitive).
    pub fn param_index_by_name(&self, kind: KernelKind, name: &str) -> Option<usize> {
        let specs = self.get(kind)?.params;
        position_of(specs, name)
            .or_else(|| specs.iter().position(|s| s.name.eq_ignore_ascii_case(name)))
    }

    /// Returns the number of registered kernels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no kernels are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, kind: KernelKind) -> Option<&RegistryEntry> {
        self.entries.iter().find(|e| e.descriptor.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synthi_core::{KernelCommand, ParamBlock, ScopeFrame};

    #[test]
    fn every_kind_is_registered() {
        let registry = KernelRegistry::new();
        assert_eq!(registry.len(), KernelKind::ALL.len());
        for kind in KernelKind::ALL {
            let descriptor = registry.get(kind).unwrap();
            assert_eq!(descriptor.id, kind.id());
        }
    }

    #[test]
    fn created_kernels_report_their_kind() {
        let registry = KernelRegistry::new();
        let tuning = KernelTuning::default();
        for kind in KernelKind::ALL {
            let kernel = registry.create(kind, 48000.0, &tuning).unwrap();
            assert_eq!(kernel.kind(), kind);
            assert_eq!(kernel.param_specs().len(), registry.get(kind).unwrap().params.len());
        }
    }

    #[test]
    fn all_kernels_process_a_block() {
        let registry = KernelRegistry::new();
        let tuning = KernelTuning::default();
        let input = [0.25f32; 128];

        for descriptor in registry.all_kernels() {
            let mut kernel = registry.create(descriptor.kind, 48000.0, &tuning).unwrap();
            let mut bufs = [[0.0f32; 128]; 4];
            let [a, b, c, d] = &mut bufs;
            let mut outputs: [&mut [f32]; 4] = [a, b, c, d];
            let n_out = descriptor.outputs.len();
            let alive = kernel.process(&[&input, &input], &mut outputs[..n_out], &[]);
            assert!(alive, "{} stopped", descriptor.id);
            assert!(
                bufs.iter().flatten().all(|s| s.is_finite()),
                "{} produced non-finite output",
                descriptor.id
            );
        }
    }

    #[test]
    fn lookup_by_id() {
        let registry = KernelRegistry::new();
        assert_eq!(registry.get_by_id("output").map(|d| d.kind), Some(KernelKind::OutputStage));
        assert!(registry.get_by_id("reverb").is_none());
        assert!(registry.create_by_id("reverb", 48000.0, &KernelTuning::default()).is_none());
    }

    #[test]
    fn roles() {
        let registry = KernelRegistry::new();
        assert_eq!(registry.kernels_with_role(KernelRole::Source).len(), 2);
        assert_eq!(registry.kernels_with_role(KernelRole::Processor).len(), 1);
        assert_eq!(registry.kernels_with_role(KernelRole::Observer).len(), 1);
        assert_eq!(KernelRole::Observer.name(), "Observer");
    }

    #[test]
    fn param_lookup_by_id_and_name() {
        let registry = KernelRegistry::new();
        assert_eq!(registry.param_index_by_name(KernelKind::Oscillator, "pulse_width"), Some(2));
        assert_eq!(registry.param_index_by_name(KernelKind::Oscillator, "Pulse Width"), Some(2));
        assert_eq!(registry.param_index_by_name(KernelKind::OutputStage, "pan"), Some(2));
        assert_eq!(registry.param_index_by_name(KernelKind::Noise, "missing"), None);
    }

    #[test]
    fn tuning_reaches_the_scope() {
        let registry = KernelRegistry::new();
        let tuning = KernelTuning {
            scope_window: WindowSize::W512,
            ..KernelTuning::default()
        };
        let mut scope = registry
            .create(KernelKind::TriggerCapture, 48000.0, &tuning)
            .unwrap();
        scope.apply(KernelCommand::SetTriggerEnabled(false));
        let a = [0.5f32; 512];
        scope.process(&[&a], &mut [], &[ParamBlock::Constant(0.0)]);
        let mut frame = ScopeFrame::for_any_window();
        assert!(scope.take_snapshot(&mut frame));
        assert_eq!(frame.len(), 512);
    }
}
