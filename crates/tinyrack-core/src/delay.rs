//! Circular delay line with linear interpolation.
//!
//! Backs the delay, chorus and reverb variants. The buffer is allocated when
//! the effect is built on the control path; reads and writes never allocate.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::flush_denormal;

/// Fixed-capacity circular delay line.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Creates a delay line holding up to `max_delay` samples.
    pub fn new(max_delay: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay.max(1) + 1],
            write_pos: 0,
        }
    }

    /// Longest readable delay in samples.
    pub fn max_delay(&self) -> usize {
        self.buffer.len() - 1
    }

    /// Pushes one sample into the line.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = flush_denormal(sample);
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Reads the sample written `delay` samples ago (integer delay, >= 1).
    #[inline]
    pub fn read(&self, delay: usize) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1, len - 1);
        self.buffer[(self.write_pos + len - delay) % len]
    }

    /// Reads with linear interpolation at a fractional delay.
    #[inline]
    pub fn read_interpolated(&self, delay: f32) -> f32 {
        let max = self.max_delay() as f32;
        let delay = delay.clamp(1.0, max - 1.0);
        let whole = delay as usize;
        let frac = delay - whole as f32;
        let a = self.read(whole);
        let b = self.read(whole + 1);
        a + (b - a) * frac
    }

    /// Zeroes the line.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}
