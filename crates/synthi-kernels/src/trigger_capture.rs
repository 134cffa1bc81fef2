//! Triggered dual-channel capture for the oscilloscope.
//!
//! Both channels are written into rings of `2×N` samples. Every N samples a
//! window of N is extracted into a preallocated [`ScopeFrame`]:
//!
//! 1. Trigger disabled: the most recent N samples, untriggered.
//! 2. Otherwise the earlier half of channel A is scanned for a rising crossing
//!    `prev < level ≤ curr`; the window starts there.
//! 3. No crossing: the most recent N samples, untriggered.
//!
//! Storage is sized for [`WindowSize::MAX`] at construction, so window size
//! changes never allocate.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use synthi_core::{
    Kernel, KernelCommand, KernelKind, Lifecycle, ParamBlock, ParamSpec, ScopeFrame, WindowSize,
    block_len, fill_silence,
};

/// Dual-channel triggered capture.
///
/// Inputs: 0 = channel A (trigger source), 1 = channel B. Missing channels
/// read as silence. Any outputs provided are silenced.
///
/// # Example
///
/// ```rust
/// use synthi_core::{Kernel, ScopeFrame, WindowSize};
/// use synthi_kernels::TriggerCapture;
///
/// let mut scope = TriggerCapture::new(48000.0, WindowSize::W512);
/// let a: Vec<f32> = (0..512).map(|i| (i as f32 * 0.05).sin()).collect();
/// scope.process(&[&a], &mut [], &[]);
///
/// let mut frame = ScopeFrame::for_any_window();
/// assert!(scope.take_snapshot(&mut frame));
/// assert_eq!(frame.len(), 512);
/// ```
#[derive(Debug, Clone)]
pub struct TriggerCapture {
    ring_a: Vec<f32>,
    ring_b: Vec<f32>,
    window: usize,
    write_pos: usize,
    pending: usize,
    trigger_level: f32,
    trigger_enabled: bool,
    frame: ScopeFrame,
    fresh: bool,
    life: Lifecycle,
}

impl TriggerCapture {
    /// Create a capture with the given initial window.
    pub fn new(sample_rate: f32, window: WindowSize) -> Self {
        let capacity = 2 * WindowSize::MAX.samples();
        let mut frame = ScopeFrame::for_any_window();
        frame.sample_rate = sample_rate;
        Self {
            ring_a: vec![0.0; capacity],
            ring_b: vec![0.0; capacity],
            window: window.samples(),
            write_pos: 0,
            pending: 0,
            trigger_level: 0.0,
            trigger_enabled: true,
            frame,
            fresh: false,
            life: Lifecycle::default(),
        }
    }

    /// Active window length N.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Trigger threshold.
    pub fn trigger_level(&self) -> f32 {
        self.trigger_level
    }

    /// Whether edge detection is enabled.
    pub fn is_trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    /// Most recent extracted window.
    pub fn latest(&self) -> &ScopeFrame {
        &self.frame
    }

    #[inline]
    fn ring_len(&self) -> usize {
        2 * self.window
    }

    /// Physical index of logical position `i` (0 = oldest sample).
    #[inline]
    fn physical(&self, i: usize) -> usize {
        (self.write_pos + i) % self.ring_len()
    }

    fn find_trigger(&self) -> Option<usize> {
        let level = self.trigger_level;
        let mut prev = self.ring_a[self.physical(0)];
        for i in 1..=self.window {
            let curr = self.ring_a[self.physical(i)];
            if prev < level && level <= curr {
                return Some(i);
            }
            prev = curr;
        }
        None
    }

    fn extract(&mut self) {
        let trigger = if self.trigger_enabled { self.find_trigger() } else { None };
        let start = trigger.unwrap_or(self.window);

        self.frame.channel_a.clear();
        self.frame.channel_b.clear();
        for i in start..start + self.window {
            let p = self.physical(i);
            self.frame.channel_a.push(self.ring_a[p]);
            self.frame.channel_b.push(self.ring_b[p]);
        }
        self.frame.triggered = trigger.is_some();
        self.fresh = true;
    }

    fn restart(&mut self) {
        self.ring_a.fill(0.0);
        self.ring_b.fill(0.0);
        self.write_pos = 0;
        self.pending = 0;
        self.fresh = false;
    }
}

impl Kernel for TriggerCapture {
    fn kind(&self) -> KernelKind {
        KernelKind::TriggerCapture
    }

    fn process(
        &mut self,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        _params: &[ParamBlock<'_>],
    ) -> bool {
        let len = block_len(inputs, outputs);
        fill_silence(outputs);
        if self.life.is_silent() {
            return self.life.keep_alive();
        }

        let a = inputs.first().copied().unwrap_or(&[]);
        let b = inputs.get(1).copied().unwrap_or(&[]);
        let ring_len = self.ring_len();

        for i in 0..len {
            self.ring_a[self.write_pos] = a.get(i).copied().unwrap_or(0.0);
            self.ring_b[self.write_pos] = b.get(i).copied().unwrap_or(0.0);
            self.write_pos = (self.write_pos + 1) % ring_len;
            self.pending += 1;
            if self.pending == self.window {
                self.extract();
                self.pending = 0;
            }
        }

        self.life.keep_alive()
    }

    fn apply(&mut self, command: KernelCommand) {
        if self.life.apply(self.kind(), command) {
            return;
        }
        match command {
            KernelCommand::SetTriggerLevel(level) if level.is_finite() => {
                self.trigger_level = level;
            }
            KernelCommand::SetTriggerEnabled(enabled) => self.trigger_enabled = enabled,
            KernelCommand::SetBufferSize(size) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(from = self.window, to = size.samples(), "scope window");
                self.window = size.samples();
                self.restart();
            }
            _ => {}
        }
    }

    fn is_dormant(&self) -> bool {
        self.life.is_dormant()
    }

    fn reset(&mut self) {
        self.restart();
    }

    fn take_snapshot(&mut self, dest: &mut ScopeFrame) -> bool {
        if !self.fresh {
            return false;
        }
        dest.copy_from(&self.frame);
        self.fresh = false;
        true
    }

    fn param_specs(&self) -> &'static [ParamSpec] {
        &[]
    }
}
