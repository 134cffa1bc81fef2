//! Typed control messages delivered to kernels at block boundaries.
//!
//! UI and matrix threads never touch kernel state directly. They post a
//! [`KernelCommand`] into the control channel; the host drains the channel
//! before each block and hands every command to [`Kernel::apply`](crate::Kernel::apply).
//! A kernel ignores commands that do not concern it.

use core::fmt;

/// Oscillator waveform selected for single-output mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Asymmetric sine (cosine/shaped-triangle blend).
    #[default]
    Sine,
    /// PolyBLEP sawtooth.
    Saw,
    /// Triangle.
    Triangle,
    /// PolyBLEP pulse with variable width.
    Pulse,
}

impl Waveform {
    /// All waveforms in multi-output channel order.
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Triangle,
        Waveform::Pulse,
    ];

    /// Output channel index in multi-output mode.
    pub const fn channel(self) -> usize {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Triangle => 2,
            Waveform::Pulse => 3,
        }
    }

    /// Lowercase identifier.
    pub const fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Triangle => "triangle",
            Waveform::Pulse => "pulse",
        }
    }
}

/// Oscillator output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OscillatorMode {
    /// One waveform on output 0.
    Single,
    /// Sine, saw, triangle and pulse on outputs 0..4, pulse centred on the sine peak.
    #[default]
    Multi,
}

/// Display window of the trigger capture, in samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WindowSize {
    /// 512 samples.
    W512,
    /// 1024 samples.
    #[default]
    W1024,
    /// 2048 samples.
    W2048,
    /// 4096 samples.
    W4096,
}

impl WindowSize {
    /// Largest supported window.
    pub const MAX: WindowSize = WindowSize::W4096;

    /// Window length in samples.
    pub const fn samples(self) -> usize {
        match self {
            WindowSize::W512 => 512,
            WindowSize::W1024 => 1024,
            WindowSize::W2048 => 2048,
            WindowSize::W4096 => 4096,
        }
    }

    /// Parse a sample count, rejecting anything but the four supported sizes.
    pub fn from_samples(samples: usize) -> Result<Self, UnsupportedWindowSize> {
        match samples {
            512 => Ok(WindowSize::W512),
            1024 => Ok(WindowSize::W1024),
            2048 => Ok(WindowSize::W2048),
            4096 => Ok(WindowSize::W4096),
            other => Err(UnsupportedWindowSize(other)),
        }
    }
}

impl TryFrom<usize> for WindowSize {
    type Error = UnsupportedWindowSize;

    fn try_from(samples: usize) -> Result<Self, Self::Error> {
        Self::from_samples(samples)
    }
}

/// A window size outside {512, 1024, 2048, 4096} was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedWindowSize(pub usize);

impl fmt::Display for UnsupportedWindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported window size {} (expected 512, 1024, 2048 or 4096)",
            self.0
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnsupportedWindowSize {}

/// Control message consumed by a kernel between blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelCommand {
    /// Stop processing; the host stops invoking the kernel.
    Stop,
    /// Reset the oscillator phase to zero.
    ResetPhase,
    /// Select the waveform used in single-output mode.
    SetWaveform(Waveform),
    /// Switch oscillator output layout.
    SetMode(OscillatorMode),
    /// Enter or leave dormancy (silence with preserved state).
    SetDormant(bool),
    /// Trigger level for the capture kernel.
    SetTriggerLevel(f32),
    /// Enable or disable triggered capture.
    SetTriggerEnabled(bool),
    /// Change the capture window.
    SetBufferSize(WindowSize),
    /// Force the tone filter out of the signal path.
    SetFilterBypassed(bool),
}
