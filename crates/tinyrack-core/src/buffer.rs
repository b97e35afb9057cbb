//! Fixed-capacity sample buffers sized to one render cycle.
//!
//! Buffers are allocated once at boot with a capacity of the largest cycle the
//! engine will ever render. Per cycle only the first `frames` samples are
//! touched, so nothing on the render path allocates.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Mono float buffer holding one tone generator's output for a cycle.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    /// Creates a zeroed buffer that can hold `capacity` frames.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
        }
    }

    /// Maximum number of frames per cycle.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// First `frames` samples.
    ///
    /// # Panics
    ///
    /// Panics if `frames > capacity()`.
    #[inline]
    pub fn frames(&self, frames: usize) -> &[f32] {
        &self.samples[..frames]
    }

    /// First `frames` samples, mutable.
    #[inline]
    pub fn frames_mut(&mut self, frames: usize) -> &mut [f32] {
        &mut self.samples[..frames]
    }

    /// Zeroes the whole buffer.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}

/// A stereo buffer (separate left/right channels).
#[derive(Debug, Clone)]
pub struct StereoBuffer {
    /// Left channel samples.
    pub left: Vec<f32>,
    /// Right channel samples.
    pub right: Vec<f32>,
}

impl StereoBuffer {
    /// Creates a new zeroed stereo buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            left: vec![0.0; capacity],
            right: vec![0.0; capacity],
        }
    }

    /// Fills both channels with zeros.
    pub fn clear(&mut self) {
        self.left.fill(0.0);
        self.right.fill(0.0);
    }

    /// Returns the number of samples per channel.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns true if the buffer has zero length.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Both channels truncated to `frames`, mutable.
    #[inline]
    pub fn split_mut(&mut self, frames: usize) -> (&mut [f32], &mut [f32]) {
        (&mut self.left[..frames], &mut self.right[..frames])
    }

    /// Adds `other * scale` into this buffer over the first `frames` samples.
    pub fn accumulate_scaled(&mut self, other: &StereoBuffer, scale: f32, frames: usize) {
        for (dst, src) in self.left[..frames].iter_mut().zip(&other.left[..frames]) {
            *dst += *src * scale;
        }
        for (dst, src) in self.right[..frames].iter_mut().zip(&other.right[..frames]) {
            *dst += *src * scale;
        }
    }

    /// Largest absolute sample over the first `frames` samples of both channels.
    pub fn peak(&self, frames: usize) -> f32 {
        self.left[..frames]
            .iter()
            .chain(&self.right[..frames])
            .fold(0.0_f32, |acc, s| acc.max(s.abs()))
    }
}
