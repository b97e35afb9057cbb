//! Output device abstraction.
//!
//! The engine only needs four things from whatever sits downstream: how big
//! its queue is, how much of it is free, how many channels a frame has, and a
//! non-blocking write that reports how many bytes it took.
//!
//! ```text
//! RenderEngine::process
//!   free = available_frames()
//!   free * 2 < capacity_frames()  ──▶ skip the cycle
//!   written = write(bytes)
//!   written < bytes.len()          ──▶ log, drop the remainder
//! ```

use std::collections::VecDeque;

use tinyrack_core::SampleFormat;

/// Sink for interleaved little-endian fixed-point frames.
pub trait OutputDevice {
    /// Total queue size in frames.
    fn capacity_frames(&self) -> usize;

    /// Frames that can currently be written without blocking.
    fn available_frames(&self) -> usize;

    /// Channels per frame.
    fn channels(&self) -> usize;

    /// Writes as much of `bytes` as fits and returns the number of bytes
    /// accepted. Never blocks.
    fn write(&mut self, bytes: &[u8]) -> usize;
}

impl<D: OutputDevice + ?Sized> OutputDevice for Box<D> {
    fn capacity_frames(&self) -> usize {
        (**self).capacity_frames()
    }

    fn available_frames(&self) -> usize {
        (**self).available_frames()
    }

    fn channels(&self) -> usize {
        (**self).channels()
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        (**self).write(bytes)
    }
}

/// In-memory device queue.
///
/// Stands in for a DAC's DMA queue: the engine writes into it and the
/// consumer drains it with [`consume_frames`](Self::consume_frames) or
/// [`take_bytes`](Self::take_bytes).
#[derive(Debug, Clone)]
pub struct QueueDevice {
    queue: VecDeque<u8>,
    capacity_frames: usize,
    channels: usize,
    frame_bytes: usize,
}

impl QueueDevice {
    /// Empty queue holding at most `capacity_frames` frames.
    pub fn new(capacity_frames: usize, channels: usize, format: SampleFormat) -> Self {
        let channels = channels.max(1);
        let frame_bytes = channels * format.bytes_per_sample();
        Self {
            queue: VecDeque::with_capacity(capacity_frames * frame_bytes),
            capacity_frames,
            channels,
            frame_bytes,
        }
    }

    /// Whole frames currently queued.
    pub fn queued_frames(&self) -> usize {
        self.queue.len() / self.frame_bytes
    }

    /// Bytes currently queued.
    pub fn queued_bytes(&self) -> usize {
        self.queue.len()
    }

    /// Drops up to `frames` frames from the head of the queue, as the DAC
    /// would by playing them. Returns the frames removed.
    pub fn consume_frames(&mut self, frames: usize) -> usize {
        let bytes = (frames * self.frame_bytes).min(self.queue.len());
        self.queue.drain(..bytes);
        bytes / self.frame_bytes
    }

    /// Removes and returns everything queued.
    pub fn take_bytes(&mut self) -> Vec<u8> {
        self.queue.drain(..).collect()
    }
}

impl OutputDevice for QueueDevice {
    fn capacity_frames(&self) -> usize {
        self.capacity_frames
    }

    fn available_frames(&self) -> usize {
        self.capacity_frames.saturating_sub(self.queued_frames())
    }

    fn channels(&self) -> usize {
        self.channels
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let free = (self.capacity_frames * self.frame_bytes).saturating_sub(self.queue.len());
        let accepted = bytes.len().min(free);
        self.queue.extend(&bytes[..accepted]);
        accepted
    }
}
