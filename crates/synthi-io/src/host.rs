//! Kernel host: slot ownership, block-boundary command draining, scope egress.
//!
//! The host is the render thread's view of a set of kernels. Routing between
//! kernels (the patch matrix) lives outside; the host only guarantees the
//! ordering rules every kernel relies on:
//!
//! 1. commands are applied only between blocks ([`KernelHost::begin_block`]);
//! 2. a kernel whose `process` returned `false` is never invoked again;
//! 3. nothing on the render path allocates, locks or blocks.

use crate::control::{ControlReceiver, SlotId};
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use synthi_core::{Kernel, ParamBlock, ScopeFrame, fill_silence};

struct Slot {
    kernel: Box<dyn Kernel + Send>,
    running: bool,
}

/// Owns kernels and drives them block by block.
///
/// The host uses `Send` bounds so it can be built on one thread and moved
/// into an audio callback.
pub struct KernelHost {
    slots: Vec<Slot>,
    control: ControlReceiver,
    misaddressed: u64,
}

impl KernelHost {
    /// Create an empty host reading commands from `control`.
    pub fn new(control: ControlReceiver) -> Self {
        Self {
            slots: Vec::new(),
            control,
            misaddressed: 0,
        }
    }

    /// Install a kernel. Call during setup, not from the render loop.
    pub fn add(&mut self, kernel: Box<dyn Kernel + Send>) -> SlotId {
        tracing::debug!(kind = kernel.kind().id(), slot = self.slots.len(), "kernel added");
        self.slots.push(Slot {
            kernel,
            running: true,
        });
        SlotId(self.slots.len() - 1)
    }

    /// Number of slots, stopped ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no kernel has been added.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether the kernel in `slot` is still being invoked.
    pub fn is_running(&self, slot: SlotId) -> bool {
        self.slots.get(slot.0).is_some_and(|s| s.running)
    }

    /// Borrow a kernel for inspection.
    pub fn kernel(&self, slot: SlotId) -> Option<&(dyn Kernel + Send + 'static)> {
        self.slots.get(slot.0).map(|s| s.kernel.as_ref())
    }

    /// Borrow a kernel mutably. Only between blocks.
    pub fn kernel_mut(&mut self, slot: SlotId) -> Option<&mut (dyn Kernel + Send + 'static)> {
        self.slots.get_mut(slot.0).map(|s| s.kernel.as_mut())
    }

    /// Commands received for slots that do not exist.
    pub fn misaddressed_commands(&self) -> u64 {
        self.misaddressed
    }

    /// Drain every pending command into its kernel.
    ///
    /// Call once before each block. Returns the number of commands applied.
    pub fn begin_block(&mut self) -> usize {
        let mut applied = 0;
        while let Some(cmd) = self.control.try_next() {
            match self.slots.get_mut(cmd.slot.0) {
                Some(slot) if slot.running => {
                    slot.kernel.apply(cmd.command);
                    applied += 1;
                }
                Some(_) => {}
                None => self.misaddressed += 1,
            }
        }
        applied
    }

    /// Render one block of the kernel in `slot`.
    ///
    /// Stopped or unknown slots write silence and return `false`.
    pub fn process(
        &mut self,
        slot: SlotId,
        inputs: &[&[f32]],
        outputs: &mut [&mut [f32]],
        params: &[ParamBlock<'_>],
    ) -> bool {
        let Some(entry) = self.slots.get_mut(slot.0).filter(|s| s.running) else {
            fill_silence(outputs);
            return false;
        };
        let keep_alive = entry.kernel.process(inputs, outputs, params);
        if !keep_alive {
            entry.running = false;
            tracing::info!(kind = entry.kernel.kind().id(), slot = slot.0, "kernel stopped");
        }
        keep_alive
    }

    /// Offer every running kernel's latest display window to `egress`.
    ///
    /// Returns the number of frames published.
    pub fn publish_snapshots(&mut self, egress: &mut ScopeEgress) -> usize {
        self.slots
            .iter_mut()
            .filter(|s| s.running)
            .map(|s| usize::from(egress.publish(s.kernel.as_mut())))
            .sum()
    }

    /// Reset every kernel's state. Only between blocks.
    pub fn reset_all(&mut self) {
        for slot in &mut self.slots {
            slot.kernel.reset();
        }
    }
}

/// Create a scope frame pool of `pool_size` preallocated frames.
///
/// The [`ScopeEgress`] half stays on the render thread; the [`ScopeReader`]
/// half goes to whatever draws the scope.
pub fn scope_channel(pool_size: usize) -> (ScopeEgress, ScopeReader) {
    let pool_size = pool_size.max(1);
    let (free_tx, free_rx) = bounded(pool_size);
    let (ready_tx, ready_rx) = bounded(pool_size);
    for _ in 0..pool_size {
        let _ = free_tx.try_send(ScopeFrame::for_any_window());
    }
    (
        ScopeEgress {
            free_rx,
            ready_tx,
            spare: None,
            scratch: ScopeFrame::for_any_window(),
            published: 0,
            dropped: 0,
        },
        ScopeReader { free_tx, ready_rx },
    )
}

/// Render-side half of the scope frame pool.
pub struct ScopeEgress {
    free_rx: Receiver<ScopeFrame>,
    ready_tx: Sender<ScopeFrame>,
    /// Pooled frame taken but not filled last time.
    spare: Option<ScopeFrame>,
    /// Sink for snapshots that find no free frame.
    scratch: ScopeFrame,
    published: u64,
    dropped: u64,
}

impl ScopeEgress {
    /// Copy the kernel's pending window into a pooled frame and send it.
    ///
    /// When every frame is in use the window is still consumed from the
    /// kernel (so it does not pile up) but dropped and counted.
    pub fn publish<K: Kernel + ?Sized>(&mut self, kernel: &mut K) -> bool {
        let Some(mut frame) = self.spare.take().or_else(|| self.free_rx.try_recv().ok()) else {
            if kernel.take_snapshot(&mut self.scratch) {
                self.dropped += 1;
            }
            return false;
        };

        if !kernel.take_snapshot(&mut frame) {
            self.spare = Some(frame);
            return false;
        }

        match self.ready_tx.try_send(frame) {
            Ok(()) => {
                self.published += 1;
                true
            }
            Err(TrySendError::Full(frame) | TrySendError::Disconnected(frame)) => {
                self.spare = Some(frame);
                self.dropped += 1;
                false
            }
        }
    }

    /// Frames handed to the reader so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Windows dropped for lack of a free frame.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Display-side half of the scope frame pool.
pub struct ScopeReader {
    free_tx: Sender<ScopeFrame>,
    ready_rx: Receiver<ScopeFrame>,
}

impl ScopeReader {
    /// Take the oldest ready frame.
    pub fn try_next(&self) -> Option<ScopeFrame> {
        self.ready_rx.try_recv().ok()
    }

    /// Take the newest ready frame, recycling any older ones.
    pub fn latest(&self) -> Option<ScopeFrame> {
        let mut newest = None;
        while let Ok(frame) = self.ready_rx.try_recv() {
            if let Some(older) = newest.replace(frame) {
                self.recycle(older);
            }
        }
        newest
    }

    /// Return a frame to the pool once drawn.
    pub fn recycle(&self, frame: ScopeFrame) {
        let _ = self.free_tx.try_send(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::control_channel;
    use synthi_core::{KernelCommand, KernelKind, Lifecycle, ParamSpec};

    /// Writes a running counter and publishes a frame every block.
    struct Counter {
        life: Lifecycle,
        value: f32,
    }

    impl Kernel for Counter {
        fn kind(&self) -> KernelKind {
            KernelKind::Noise
        }

        fn process(
            &mut self,
            _inputs: &[&[f32]],
            outputs: &mut [&mut [f32]],
            _params: &[ParamBlock<'_>],
        ) -> bool {
            if self.life.is_silent() {
                fill_silence(outputs);
                return self.life.keep_alive();
            }
            for out in outputs.iter_mut() {
                for s in out.iter_mut() {
                    self.value += 1.0;
                    *s = self.value;
                }
            }
            true
        }

        fn apply(&mut self, command: KernelCommand) {
            self.life.apply(KernelKind::Noise, command);
        }

        fn is_dormant(&self) -> bool {
            self.life.is_dormant()
        }

        fn reset(&mut self) {
            self.value = 0.0;
        }

        fn take_snapshot(&mut self, dest: &mut ScopeFrame) -> bool {
            dest.channel_a.clear();
            dest.channel_a.push(self.value);
            true
        }

        fn param_specs(&self) -> &'static [ParamSpec] {
            &[]
        }
    }

    fn counter() -> Box<dyn Kernel + Send> {
        Box::new(Counter {
            life: Lifecycle::default(),
            value: 0.0,
        })
    }

    #[test]
    fn stop_takes_effect_at_block_boundary() {
        let (tx, rx) = control_channel(8);
        let mut host = KernelHost::new(rx);
        let slot = host.add(counter());
        let mut buf = [0.0f32; 4];

        assert!(host.process(slot, &[], &mut [&mut buf], &[]));
        tx.stop(slot).unwrap();
        // Not yet drained: the block still renders.
        assert!(host.process(slot, &[], &mut [&mut buf], &[]));
        assert_eq!(buf[3], 8.0);

        assert_eq!(host.begin_block(), 1);
        assert!(!host.process(slot, &[], &mut [&mut buf], &[]));
        assert!(!host.is_running(slot));
        assert_eq!(buf, [0.0; 4]);
    }

    #[test]
    fn misaddressed_commands_are_counted() {
        let (tx, rx) = control_channel(8);
        let mut host = KernelHost::new(rx);
        tx.stop(SlotId(7)).unwrap();
        assert_eq!(host.begin_block(), 0);
        assert_eq!(host.misaddressed_commands(), 1);
    }

    #[test]
    fn kernels_are_reachable_between_blocks() {
        let (_tx, rx) = control_channel(1);
        let mut host = KernelHost::new(rx);
        let slot = host.add(counter());
        let mut buf = [0.0f32; 4];
        host.process(slot, &[], &mut [&mut buf], &[]);
        assert_eq!(buf, [1.0, 2.0, 3.0, 4.0]);

        host.kernel_mut(slot).unwrap().reset();
        host.process(slot, &[], &mut [&mut buf], &[]);
        assert_eq!(buf[0], 1.0);
        assert_eq!(host.kernel(slot).unwrap().kind(), KernelKind::Noise);
        assert!(host.kernel_mut(SlotId(3)).is_none());
    }

    #[test]
    fn unknown_slot_renders_silence() {
        let (_tx, rx) = control_channel(1);
        let mut host = KernelHost::new(rx);
        let mut buf = [1.0f32; 4];
        assert!(!host.process(SlotId(0), &[], &mut [&mut buf], &[]));
        assert_eq!(buf, [0.0; 4]);
    }

    #[test]
    fn exhausted_pool_drops_and_counts() {
        let (mut egress, reader) = scope_channel(2);
        let mut k = Counter {
            life: Lifecycle::default(),
            value: 0.0,
        };

        assert!(egress.publish(&mut k));
        assert!(egress.publish(&mut k));
        assert!(!egress.publish(&mut k));
        assert_eq!(egress.dropped(), 1);

        let frame = reader.latest().unwrap();
        reader.recycle(frame);
        assert!(egress.publish(&mut k));
        assert_eq!(egress.published(), 3);
    }

    #[test]
    fn latest_recycles_older_frames() {
        let (mut egress, reader) = scope_channel(3);
        let mut k = Counter {
            life: Lifecycle::default(),
            value: 0.0,
        };
        for _ in 0..3 {
            k.value += 1.0;
            egress.publish(&mut k);
        }
        let newest = reader.latest().unwrap();
        assert_eq!(newest.channel_a, vec![3.0]);
        // Two frames went back to the pool.
        assert!(egress.publish(&mut k));
        assert!(egress.publish(&mut k));
        assert!(!egress.publish(&mut k));
    }
}
