//! Synthi Kernels - render-thread voices of the analog-chain emulation
//!
//! Four block-processing kernels, each a self-contained state machine driven
//! through the [`Kernel`](synthi_core::Kernel) contract:
//!
//! - [`PhaseOscillator`] - One phase accumulator, four coherent waveforms,
//!   PolyBLEP edges, hard sync, asymmetric sine shaping
//! - [`ColourNoiseSource`] - Xorshift white noise through the colour RC network
//! - [`OutputStage`] - Tone filter, exponential VCA ([`VcaLaw`]) and equal-power pan
//! - [`TriggerCapture`] - Edge-triggered two-channel capture for the scope
//!
//! ```rust
//! use synthi_core::{Kernel, ParamBlock};
//! use synthi_kernels::{OutputStage, PhaseOscillator};
//!
//! let mut osc = PhaseOscillator::new(48000.0);
//! let mut stage = OutputStage::new(48000.0);
//!
//! let mut sine = [0.0f32; 128];
//! let mut mono = [0.0f32; 128];
//! osc.process(&[], &mut [&mut sine], &[ParamBlock::Constant(440.0)]);
//! stage.process(&[&sine], &mut [&mut mono], &[]);
//! ```
//!
//! # no_std Support
//!
//! Like `synthi-core`, this crate only needs `alloc`:
//!
//! ```toml
//! [dependencies]
//! synthi-kernels = { version = "0.1", default-features = false }
//! ```
//!
//! # Features
//!
//! - `serde` - Serialize/Deserialize for the tuning structs
//! - `tracing` - `debug` events when commands change kernel state

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod noise;
pub mod oscillator;
pub mod output_stage;
pub mod trigger_capture;
pub mod vca;

pub use noise::{ColourNoiseSource, NOISE_PARAMS, NoiseTuning, WhiteNoise};
pub use oscillator::{OSCILLATOR_PARAMS, OscillatorTuning, PhaseOscillator, poly_blep};
pub use output_stage::{OUTPUT_STAGE_PARAMS, OutputStage, OutputStageTuning};
pub use trigger_capture::TriggerCapture;
pub use vca::{DIAL_MAX, VcaLaw};
