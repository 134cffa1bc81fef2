//! Synthi Core - real-time primitives for analog-chain kernels
//!
//! This crate provides the building blocks shared by every render-thread
//! kernel of the synthesizer emulation: the kernel contract, per-block
//! control values, typed control messages, and the bilinear RC section that
//! models the instrument's passive tone networks.
//!
//! # Core Abstractions
//!
//! ## Kernel Contract
//!
//! - [`Kernel`] - Object-safe block processor with block-boundary control
//! - [`KernelKind`] - The four kernel kinds known to the registry
//! - [`Lifecycle`] - Dormancy and stop flags
//!
//! ## Controls
//!
//! - [`ParamBlock`] - A control for one block: constant or per-sample curve
//! - [`ParamSpec`] - Positional control description (name, range, default)
//! - [`KernelCommand`] - Typed control message consumed between blocks
//!
//! ## Filters
//!
//! - [`RcToneFilter`] - Bipolar one-pole bilinear RC section (low-pass ↔ high shelf)
//!
//! ## Visualization
//!
//! - [`ScopeFrame`] - Preallocated two-channel capture window
//!
//! ## Utilities
//!
//! - Math functions: [`db_to_linear`], [`cents_to_ratio`], [`flush_denormal`],
//!   [`equal_power_pan`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (it needs `alloc` for [`ScopeFrame`]).
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! synthi-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation, locking or I/O on the render path
//! - **No dependencies on std**: `libm` for math
//! - **Object-safe traits**: kernels live behind `Box<dyn Kernel + Send>` in hosts

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod command;
pub mod kernel;
pub mod math;
pub mod param;
pub mod param_info;
pub mod rc_filter;
pub mod scope;

pub use command::{KernelCommand, OscillatorMode, UnsupportedWindowSize, Waveform, WindowSize};
pub use kernel::{Kernel, KernelKind, Lifecycle, block_len, fill_silence, input};
pub use math::{
    DENORMAL_THRESHOLD, cents_to_ratio, db_to_linear, equal_power_pan, flush_denormal, lerp,
    linear_to_db,
};
pub use param::{ParamBlock, all_constant, param_or};
pub use param_info::{ParamSpec, ParamUnit, position_of};
pub use rc_filter::RcToneFilter;
pub use scope::ScopeFrame;
