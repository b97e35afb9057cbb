//! Float to fixed-point conversion and interleaving for the DAC.
//!
//! [`OutputStage`] turns one cycle of float samples into the byte stream the
//! output device expects:
//!
//! 1. convert each sample to the device's fixed-point format, saturating at
//!    full scale,
//! 2. interleave channels (optionally swapping left and right),
//! 3. if the cycle's last fixed-point sample is exactly zero, set it to one
//!    LSB so DACs with automatic analog mute never see sustained digital
//!    silence,
//! 4. serialize little-endian into a byte buffer allocated at boot.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::roundf;

use crate::buffer::SampleBuffer;

/// Fixed-point sample formats accepted by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// 16-bit signed, 2 bytes per sample.
    #[default]
    S16,
    /// 24-bit signed in a 32-bit container, right-justified and
    /// sign-extended, 4 bytes per sample.
    S24,
    /// 32-bit signed, 4 bytes per sample.
    S32,
}

impl SampleFormat {
    /// Significant bits per sample.
    pub const fn bits(self) -> u32 {
        match self {
            Self::S16 => 16,
            Self::S24 => 24,
            Self::S32 => 32,
        }
    }

    /// Bytes each sample occupies on the wire.
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::S16 => 2,
            Self::S24 | Self::S32 => 4,
        }
    }

    /// Largest positive code.
    pub const fn max_code(self) -> i32 {
        match self {
            Self::S16 => i16::MAX as i32,
            Self::S24 => (1 << 23) - 1,
            Self::S32 => i32::MAX,
        }
    }

    /// Converts one float sample, saturating outside [-1, 1].
    ///
    /// ```rust
    /// use tinyrack_core::SampleFormat;
    ///
    /// assert_eq!(SampleFormat::S16.to_fixed(1.0), 32767);
    /// assert_eq!(SampleFormat::S16.to_fixed(4.0), 32767);
    /// assert_eq!(SampleFormat::S16.to_fixed(-4.0), -32767);
    /// assert_eq!(SampleFormat::S16.to_fixed(0.0), 0);
    /// ```
    #[inline]
    pub fn to_fixed(self, sample: f32) -> i32 {
        let clamped = if sample.is_nan() {
            0.0
        } else {
            sample.clamp(-1.0, 1.0)
        };
        // `as` saturates, which covers S32 where max_code rounds up in f32.
        roundf(clamped * self.max_code() as f32) as i32
    }

    fn write_le(self, code: i32, out: &mut [u8]) {
        match self {
            Self::S16 => out.copy_from_slice(&(code as i16).to_le_bytes()),
            Self::S24 | Self::S32 => out.copy_from_slice(&code.to_le_bytes()),
        }
    }
}

/// Per-cycle conversion buffers, sized once at boot.
#[derive(Debug, Clone)]
pub struct OutputStage {
    format: SampleFormat,
    channels: usize,
    swap_channels: bool,
    frame: Vec<i32>,
    bytes: Vec<u8>,
}

impl OutputStage {
    /// Creates a stage for `channels` interleaved channels and up to
    /// `capacity` frames per cycle.
    pub fn new(format: SampleFormat, channels: usize, capacity: usize, swap_channels: bool) -> Self {
        let channels = channels.max(1);
        Self {
            format,
            channels,
            swap_channels,
            frame: vec![0; capacity * channels],
            bytes: vec![0; capacity * channels * format.bytes_per_sample()],
        }
    }

    /// Sample format written to the device.
    #[inline]
    pub fn format(&self) -> SampleFormat {
        self.format
    }

    /// Device channels per frame.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// True when left and right are exchanged on the way out.
    #[inline]
    pub fn swap_channels(&self) -> bool {
        self.swap_channels
    }

    /// Bytes per interleaved frame.
    #[inline]
    pub fn frame_bytes(&self) -> usize {
        self.channels * self.format.bytes_per_sample()
    }

    /// Converts a stereo cycle and returns the serialized bytes.
    ///
    /// Channels beyond the first two are written as silence.
    ///
    /// # Panics
    ///
    /// Panics if the cycle is longer than the stage capacity.
    pub fn convert_stereo(&mut self, left: &[f32], right: &[f32]) -> &[u8] {
        let frames = left.len().min(right.len());
        let (first, second) = if self.swap_channels {
            (right, left)
        } else {
            (left, right)
        };
        let format = self.format;
        let channels = self.channels;

        for (i, frame) in self.frame[..frames * channels]
            .chunks_exact_mut(channels)
            .enumerate()
        {
            frame.fill(0);
            frame[0] = format.to_fixed(first[i]);
            if channels > 1 {
                frame[1] = format.to_fixed(second[i]);
            }
        }

        self.finish(frames)
    }

    /// Converts one buffer per device channel (direct multi-channel mode).
    ///
    /// Missing sources are written as silence; extra sources are ignored.
    pub fn convert_channels(&mut self, sources: &[SampleBuffer], frames: usize) -> &[u8] {
        let format = self.format;
        let channels = self.channels;

        for (i, frame) in self.frame[..frames * channels]
            .chunks_exact_mut(channels)
            .enumerate()
        {
            for (ch, code) in frame.iter_mut().enumerate() {
                *code = sources
                    .get(ch)
                    .map_or(0, |src| format.to_fixed(src.frames(frames)[i]));
            }
        }

        self.finish(frames)
    }

    /// Fixed-point samples of the last converted cycle.
    pub fn samples(&self, frames: usize) -> &[i32] {
        &self.frame[..frames * self.channels]
    }

    fn finish(&mut self, frames: usize) -> &[u8] {
        let len = frames * self.channels;
        if len > 0 && self.frame[len - 1] == 0 {
            self.frame[len - 1] = 1;
        }

        let width = self.format.bytes_per_sample();
        for (code, out) in self.frame[..len]
            .iter()
            .zip(self.bytes.chunks_exact_mut(width))
        {
            self.format.write_le(*code, out);
        }
        &self.bytes[..len * width]
    }
}
