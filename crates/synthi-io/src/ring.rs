//! Lock-free single-producer/single-consumer ring of interleaved f32 frames.
//!
//! Bridges the render thread (producer) to a device callback (consumer).
//! Samples are stored as `AtomicU32` bit patterns so neither side needs a
//! lock or `unsafe`. The write cursor is only stored by the [`Producer`], the
//! read cursor only by the [`Consumer`]; cursors are monotonically increasing
//! frame counts and the capacity is a power of two, so wrap-around is a mask.
//!
//! Playback waits until `prebuffer_frames` are queued ("priming"). A read that
//! finds too little data fills the missing tail with silence and counts an
//! underflow; a read that finds the ring completely empty re-enters priming.
//! Frames pushed into a full ring are dropped and counted as overflow.

use crate::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

/// Underflow/overflow warnings are logged on the first event and then once
/// per this many events.
const LOG_EVERY: u64 = 1000;

/// Ring geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingConfig {
    /// Samples per frame
    pub channels: usize,
    /// Frames the ring can hold; rounded up to a power of two
    pub capacity_frames: usize,
    /// Frames that must be queued before the consumer starts reading
    pub prebuffer_frames: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            capacity_frames: 8192,
            prebuffer_frames: 2048,
        }
    }
}

/// Counters shared by both halves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingStats {
    /// Frames currently queued
    pub buffered_frames: usize,
    /// Push calls that dropped frames
    pub overflow_events: u64,
    /// Frames dropped on a full ring
    pub overflow_frames: u64,
    /// Pop calls that came up short
    pub underflow_events: u64,
    /// Frames replaced by silence
    pub underflow_frames: u64,
}

struct Shared {
    data: Box<[AtomicU32]>,
    channels: usize,
    mask: usize,
    write: AtomicUsize,
    read: AtomicUsize,
    overflow_events: AtomicU64,
    overflow_frames: AtomicU64,
    underflow_events: AtomicU64,
    underflow_frames: AtomicU64,
}

impl Shared {
    fn capacity(&self) -> usize {
        self.mask + 1
    }

    fn stats(&self) -> RingStats {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        RingStats {
            buffered_frames: write.wrapping_sub(read).min(self.capacity()),
            overflow_events: self.overflow_events.load(Ordering::Relaxed),
            overflow_frames: self.overflow_frames.load(Ordering::Relaxed),
            underflow_events: self.underflow_events.load(Ordering::Relaxed),
            underflow_frames: self.underflow_frames.load(Ordering::Relaxed),
        }
    }
}

/// Create a ring and split it into its two halves.
pub fn interleaved_ring(config: RingConfig) -> Result<(Producer, Consumer)> {
    if config.channels == 0 {
        return Err(Error::InvalidRing("channels must be at least 1".into()));
    }
    if config.capacity_frames == 0 {
        return Err(Error::InvalidRing("capacity must be at least 1 frame".into()));
    }
    let capacity = config
        .capacity_frames
        .checked_next_power_of_two()
        .ok_or_else(|| {
            Error::InvalidRing(format!("capacity {} too large", config.capacity_frames))
        })?;
    if config.prebuffer_frames > capacity {
        return Err(Error::InvalidRing(format!(
            "prebuffer {} exceeds capacity {capacity}",
            config.prebuffer_frames
        )));
    }

    let data = (0..capacity * config.channels)
        .map(|_| AtomicU32::new(0.0f32.to_bits()))
        .collect();
    let shared = Arc::new(Shared {
        data,
        channels: config.channels,
        mask: capacity - 1,
        write: AtomicUsize::new(0),
        read: AtomicUsize::new(0),
        overflow_events: AtomicU64::new(0),
        overflow_frames: AtomicU64::new(0),
        underflow_events: AtomicU64::new(0),
        underflow_frames: AtomicU64::new(0),
    });

    tracing::debug!(
        channels = config.channels,
        capacity,
        prebuffer = config.prebuffer_frames,
        "ring created"
    );

    Ok((
        Producer {
            shared: Arc::clone(&shared),
        },
        Consumer {
            shared,
            prebuffer: config.prebuffer_frames,
            priming: true,
        },
    ))
}

/// Writing half, owned by the render thread.
pub struct Producer {
    shared: Arc<Shared>,
}

impl Producer {
    /// Queue interleaved frames. A trailing partial frame is ignored.
    ///
    /// Returns the number of frames accepted; the rest are dropped and
    /// counted as overflow.
    pub fn push(&mut self, interleaved: &[f32]) -> usize {
        let s = &*self.shared;
        let ch = s.channels;
        let frames = interleaved.len() / ch;

        let write = s.write.load(Ordering::Relaxed);
        let read = s.read.load(Ordering::Acquire);
        let free = s.capacity() - write.wrapping_sub(read);
        let accepted = frames.min(free);

        for (f, frame) in interleaved.chunks_exact(ch).take(accepted).enumerate() {
            let base = (write.wrapping_add(f) & s.mask) * ch;
            for (slot, &x) in s.data[base..base + ch].iter().zip(frame) {
                slot.store(x.to_bits(), Ordering::Relaxed);
            }
        }
        s.write.store(write.wrapping_add(accepted), Ordering::Release);

        if accepted < frames {
            let lost = (frames - accepted) as u64;
            s.overflow_frames.fetch_add(lost, Ordering::Relaxed);
            let events = s.overflow_events.fetch_add(1, Ordering::Relaxed) + 1;
            if events == 1 || events % LOG_EVERY == 0 {
                tracing::warn!(events, lost, "ring overflow, frames dropped");
            }
        }
        accepted
    }

    /// Frames that can be pushed right now.
    pub fn free_frames(&self) -> usize {
        let s = &*self.shared;
        s.capacity() - s.write.load(Ordering::Relaxed).wrapping_sub(s.read.load(Ordering::Acquire))
    }

    /// Snapshot of the shared counters.
    pub fn stats(&self) -> RingStats {
        self.shared.stats()
    }
}

/// Reading half, owned by the device callback.
pub struct Consumer {
    shared: Arc<Shared>,
    prebuffer: usize,
    priming: bool,
}

impl Consumer {
    /// Fill `out` with interleaved frames.
    ///
    /// Always writes all of `out`: while priming the whole buffer is silence,
    /// and a short read is padded with silence. Returns the number of real
    /// frames delivered.
    pub fn pop(&mut self, out: &mut [f32]) -> usize {
        let s = &*self.shared;
        let ch = s.channels;
        let frames = out.len() / ch;

        let read = s.read.load(Ordering::Relaxed);
        let available = s.write.load(Ordering::Acquire).wrapping_sub(read);

        if self.priming {
            if available == 0 || available < self.prebuffer {
                out.fill(0.0);
                return 0;
            }
            self.priming = false;
            tracing::debug!(available, "ring primed, starting playback");
        }

        let delivered = frames.min(available);
        for (f, frame) in out.chunks_exact_mut(ch).take(delivered).enumerate() {
            let base = (read.wrapping_add(f) & s.mask) * ch;
            for (x, slot) in frame.iter_mut().zip(&s.data[base..base + ch]) {
                *x = f32::from_bits(slot.load(Ordering::Relaxed));
            }
        }
        s.read.store(read.wrapping_add(delivered), Ordering::Release);
        out[delivered * ch..].fill(0.0);

        if delivered < frames {
            let missing = (frames - delivered) as u64;
            s.underflow_frames.fetch_add(missing, Ordering::Relaxed);
            let events = s.underflow_events.fetch_add(1, Ordering::Relaxed) + 1;
            if events == 1 || events % LOG_EVERY == 0 {
                tracing::warn!(events, missing, "ring underflow, padding with silence");
            }
            if delivered == available {
                self.priming = true;
            }
        }
        delivered
    }

    /// Whether the consumer is waiting for the pre-buffer to fill.
    pub fn is_priming(&self) -> bool {
        self.priming
    }

    /// Snapshot of the shared counters.
    pub fn stats(&self) -> RingStats {
        self.shared.stats()
    }
}
