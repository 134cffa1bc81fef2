//! The render-thread contract shared by every kernel.
//!
//! A [`Kernel`] is a self-contained state machine invoked once per fixed-size
//! block by the host audio graph:
//!
//! ```text
//! process(inputs, outputs, params) -> keep_alive
//! ```
//!
//! ## Design Decisions
//!
//! - **Object-safe**: the registry hands out `Box<dyn Kernel + Send>` so a host
//!   can hold heterogeneous kernels in one list. Kernels also expose typed
//!   inherent methods for direct use.
//!
//! - **No allocations, locks or I/O** inside `process`. Every output slice the
//!   host provides is fully written on every call, silence included.
//!
//! - **Block-boundary control**: [`Kernel::apply`] is only ever called between
//!   blocks, so the math inside one block always sees consistent settings.
//!
//! - **Dormancy is data, not scheduling**: a dormant kernel still gets
//!   `process` calls; it writes silence and leaves its state untouched.

use crate::{KernelCommand, ParamBlock, ParamSpec, ScopeFrame};

/// Kinds of kernel known to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// Multi-waveform phase oscillator.
    Oscillator,
    /// Coloured noise source.
    Noise,
    /// RC tone filter + VCA + pan.
    OutputStage,
    /// Triggered dual-channel capture.
    TriggerCapture,
}

impl KernelKind {
    /// All kinds, in registry order.
    pub const ALL: [KernelKind; 4] = [
        KernelKind::Oscillator,
        KernelKind::Noise,
        KernelKind::OutputStage,
        KernelKind::TriggerCapture,
    ];

    /// Stable lowercase identifier.
    pub const fn id(self) -> &'static str {
        match self {
            KernelKind::Oscillator => "oscillator",
            KernelKind::Noise => "noise",
            KernelKind::OutputStage => "output",
            KernelKind::TriggerCapture => "scope",
        }
    }

    /// Parse an identifier produced by [`id`](Self::id).
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

/// Core trait for all render-thread kernels.
///
/// `inputs` are signal blocks (sync, audio, control voltage), `outputs` are
/// the blocks to fill, `params` are the kernel's controls in the order given
/// by [`param_specs`](Kernel::param_specs). Missing inputs read as silence,
/// missing params use their defaults.
pub trait Kernel {
    /// Which kind of kernel this is.
    fn kind(&self) -> KernelKind;

    /// Render one block.
    ///
    /// Returns `false` once the kernel has been stopped; the host must then
    /// stop invoking it. Outputs are written in full either way.
    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &[ParamBlock<'_>],
    ) -> bool;

    /// Apply a control message. Only called between blocks.
    fn apply(&mut self, command: KernelCommand);

    /// Whether the kernel is currently dormant.
    fn is_dormant(&self) -> bool;

    /// Clear all internal state (phase, filter history, capture buffers)
    /// without changing settings.
    fn reset(&mut self);

    /// Copy the most recent visualization window into `dest`.
    ///
    /// Returns `true` if a new window was available. Kernels without a display
    /// output always return `false`.
    fn take_snapshot(&mut self, dest: &mut ScopeFrame) -> bool {
        let _ = dest;
        false
    }

    /// Positional control descriptions.
    fn param_specs(&self) -> &'static [ParamSpec];
}

/// Dormancy and stop flags shared by every kernel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lifecycle {
    dormant: bool,
    stopped: bool,
}

impl Lifecycle {
    /// Handle the lifecycle commands (`Stop`, `SetDormant`).
    ///
    /// Returns `true` if the command was consumed.
    pub fn apply(&mut self, kind: KernelKind, command: KernelCommand) -> bool {
        match command {
            KernelCommand::Stop => {
                self.stopped = true;
                #[cfg(feature = "tracing")]
                tracing::debug!(kernel = kind.id(), "stop requested");
                true
            }
            KernelCommand::SetDormant(dormant) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    kernel = kind.id(),
                    dormant,
                    changed = self.dormant != dormant,
                    "dormancy"
                );
                self.dormant = dormant;
                true
            }
            _ => {
                let _ = kind;
                false
            }
        }
    }

    /// Whether the kernel should emit silence this block.
    #[inline]
    pub fn is_silent(&self) -> bool {
        self.dormant || self.stopped
    }

    /// Dormancy flag.
    #[inline]
    pub fn is_dormant(&self) -> bool {
        self.dormant
    }

    /// `keep_alive` value to return from `process`.
    #[inline]
    pub fn keep_alive(&self) -> bool {
        !self.stopped
    }
}

/// Zero every output block.
#[inline]
pub fn fill_silence(outputs: &mut [&mut [f32]]) {
    for out in outputs.iter_mut() {
        out.fill(0.0);
    }
}

/// Input channel `index`, or `None` when absent or empty.
#[inline]
pub fn input<'a>(inputs: &[&'a [f32]], index: usize) -> Option<&'a [f32]> {
    inputs.get(index).copied().filter(|s| !s.is_empty())
}

/// Block length: the longest provided output, or the longest input when the
/// kernel has no outputs (pure observers).
#[inline]
pub fn block_len(inputs: &[&[f32]], outputs: &[&mut [f32]]) -> usize {
    let out = outputs.iter().map(|o| o.len()).max().unwrap_or(0);
    if out > 0 {
        out
    } else {
        inputs.iter().map(|i| i.len()).max().unwrap_or(0)
    }
}
