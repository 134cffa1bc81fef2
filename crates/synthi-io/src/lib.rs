//! Render-thread plumbing for the synthi kernels.
//!
//! This crate provides:
//!
//! - **Control channel**: [`control_channel`] hands out a bounded
//!   [`ControlSender`] for UI/control threads and a [`ControlReceiver`] the
//!   render thread drains between blocks
//! - **Kernel host**: [`KernelHost`] owns kernel slots, applies queued
//!   commands at block boundaries and stops invoking kernels that asked to stop
//! - **Scope egress**: [`scope_channel`] recycles preallocated [`ScopeFrame`]s
//!   between the render thread and a display thread
//! - **Interleaved ring**: [`interleaved_ring`] is a lock-free SPSC ring used
//!   to bridge the render thread to a device callback
//! - **WAV file I/O**: [`read_wav`], [`write_wav`] and [`write_wav_stereo`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use synthi_io::{KernelHost, control_channel};
//! use synthi_kernels::PhaseOscillator;
//!
//! let (tx, rx) = control_channel(64);
//! let mut host = KernelHost::new(rx);
//! let osc = host.add(Box::new(PhaseOscillator::new(48000.0)));
//!
//! tx.set_buffer_size(osc, 1000).unwrap_err(); // rejected, nothing queued
//! tx.reset_phase(osc)?;
//!
//! host.begin_block();
//! host.process(osc, &[], &mut outputs, &params);
//! ```
//!
//! [`ScopeFrame`]: synthi_core::ScopeFrame

mod control;
mod host;
mod ring;
mod wav;

pub use control::{ControlReceiver, ControlSender, SlotCommand, SlotId, control_channel};
pub use host::{KernelHost, ScopeEgress, ScopeReader, scope_channel};
pub use ring::{Consumer, Producer, RingConfig, RingStats, interleaved_ring};
pub use wav::{WavInfo, WavSpec, read_wav, read_wav_info, write_wav, write_wav_stereo};

use synthi_core::UnsupportedWindowSize;

/// Error types for the render-thread plumbing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A scope window size outside 512/1024/2048/4096 was requested.
    #[error(transparent)]
    UnsupportedWindowSize(#[from] UnsupportedWindowSize),

    /// The control queue is full; the command was not sent.
    #[error("Control queue full")]
    ControlQueueFull,

    /// The render side of the control channel has been dropped.
    #[error("Control channel disconnected")]
    Disconnected,

    /// Ring buffer geometry is unusable.
    #[error("Invalid ring configuration: {0}")]
    InvalidRing(String),

    /// Stereo channels of different lengths.
    #[error("Channel length mismatch: left {left}, right {right}")]
    ChannelLengthMismatch {
        /// Left channel length
        left: usize,
        /// Right channel length
        right: usize,
    },
}

/// Convenience result type for render-thread plumbing.
pub type Result<T> = std::result::Result<T, Error>;
