//! Oscilloscope snapshot payload.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::WindowSize;

/// One captured display window for two channels.
///
/// Frames are allocated once at full capacity and then refilled by copy, so
/// moving them between the render thread and a display thread never
/// allocates.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeFrame {
    /// Channel A samples (the trigger source).
    pub channel_a: Vec<f32>,
    /// Channel B samples, aligned with channel A.
    pub channel_b: Vec<f32>,
    /// Sample rate of the captured signal in Hz.
    pub sample_rate: f32,
    /// Whether the window starts on a detected trigger edge.
    pub triggered: bool,
}

impl ScopeFrame {
    /// Create an empty frame with room for the largest window.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channel_a: Vec::with_capacity(capacity),
            channel_b: Vec::with_capacity(capacity),
            sample_rate: 0.0,
            triggered: false,
        }
    }

    /// Create an empty frame able to hold any [`WindowSize`] without reallocating.
    pub fn for_any_window() -> Self {
        Self::with_capacity(WindowSize::MAX.samples())
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.channel_a.len()
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.channel_a.is_empty()
    }

    /// Overwrite this frame with the contents of `other`.
    ///
    /// Does not allocate as long as `other` fits in the existing capacity.
    pub fn copy_from(&mut self, other: &ScopeFrame) {
        self.channel_a.clear();
        self.channel_a.extend_from_slice(&other.channel_a);
        self.channel_b.clear();
        self.channel_b.extend_from_slice(&other.channel_b);
        self.sample_rate = other.sample_rate;
        self.triggered = other.triggered;
    }
}

impl Default for ScopeFrame {
    fn default() -> Self {
        Self::for_any_window()
    }
}
