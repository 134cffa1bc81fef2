//! Typed control channel between control threads and the render thread.
//!
//! Commands are validated before they enter the queue, so the render thread
//! only ever sees well-formed [`KernelCommand`]s. An unsupported buffer size
//! is rejected here and the kernel keeps its current window.

use crate::{Error, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use synthi_core::{KernelCommand, OscillatorMode, Waveform, WindowSize};

/// Index of a kernel slot inside a [`KernelHost`](crate::KernelHost).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub usize);

/// A command addressed to one kernel slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCommand {
    /// Target slot
    pub slot: SlotId,
    /// Command to apply at the next block boundary
    pub command: KernelCommand,
}

/// Create a bounded control channel holding up to `capacity` commands.
pub fn control_channel(capacity: usize) -> (ControlSender, ControlReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    (ControlSender { tx }, ControlReceiver { rx })
}

/// Sending half, held by UI or control threads. Cloneable.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: Sender<SlotCommand>,
}

impl ControlSender {
    /// Queue a command without blocking.
    pub fn send(&self, slot: SlotId, command: KernelCommand) -> Result<()> {
        self.tx
            .try_send(SlotCommand { slot, command })
            .map_err(|e| match e {
                TrySendError::Full(_) => Error::ControlQueueFull,
                TrySendError::Disconnected(_) => Error::Disconnected,
            })
    }

    /// Stop the kernel; the host stops invoking it after the next boundary.
    pub fn stop(&self, slot: SlotId) -> Result<()> {
        self.send(slot, KernelCommand::Stop)
    }

    /// Reset oscillator phase.
    pub fn reset_phase(&self, slot: SlotId) -> Result<()> {
        self.send(slot, KernelCommand::ResetPhase)
    }

    /// Select the single-mode waveform.
    pub fn set_waveform(&self, slot: SlotId, waveform: Waveform) -> Result<()> {
        self.send(slot, KernelCommand::SetWaveform(waveform))
    }

    /// Switch oscillator output layout.
    pub fn set_mode(&self, slot: SlotId, mode: OscillatorMode) -> Result<()> {
        self.send(slot, KernelCommand::SetMode(mode))
    }

    /// Enter or leave dormancy.
    pub fn set_dormant(&self, slot: SlotId, dormant: bool) -> Result<()> {
        self.send(slot, KernelCommand::SetDormant(dormant))
    }

    /// Set the capture trigger level. Non-finite levels are rejected.
    pub fn set_trigger_level(&self, slot: SlotId, level: f32) -> Result<()> {
        if !level.is_finite() {
            tracing::debug!(level, "ignoring non-finite trigger level");
            return Ok(());
        }
        self.send(slot, KernelCommand::SetTriggerLevel(level))
    }

    /// Enable or disable triggered capture.
    pub fn set_trigger_enabled(&self, slot: SlotId, enabled: bool) -> Result<()> {
        self.send(slot, KernelCommand::SetTriggerEnabled(enabled))
    }

    /// Change the capture window.
    ///
    /// Sizes other than 512, 1024, 2048 and 4096 return
    /// [`Error::UnsupportedWindowSize`] and queue nothing.
    pub fn set_buffer_size(&self, slot: SlotId, samples: usize) -> Result<()> {
        let window = WindowSize::try_from(samples).inspect_err(|e| {
            tracing::warn!(slot = slot.0, %e, "rejected scope buffer size");
        })?;
        self.send(slot, KernelCommand::SetBufferSize(window))
    }

    /// Force the output-stage tone filter in or out of the path.
    pub fn set_filter_bypassed(&self, slot: SlotId, bypassed: bool) -> Result<()> {
        self.send(slot, KernelCommand::SetFilterBypassed(bypassed))
    }
}

/// Receiving half, owned by the render thread.
#[derive(Debug)]
pub struct ControlReceiver {
    rx: Receiver<SlotCommand>,
}

impl ControlReceiver {
    /// Pop the next pending command, never blocking.
    ///
    /// A disconnected sender reads as an empty queue.
    pub fn try_next(&self) -> Option<SlotCommand> {
        match self.rx.try_recv() {
            Ok(cmd) => Some(cmd),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Number of commands waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}
