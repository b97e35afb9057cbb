//! Stereo summing bus with ramped per-channel gain and pan.
//!
//! A [`MixBus`] sums a fixed set of mono channels (one per tone generator)
//! into a stereo accumulator. Each channel carries a gain and a pan position;
//! together they give a left and a right coefficient:
//!
//! ```text
//! (pan_l, pan_r) = constant_power_pan(pan)
//! coeff_l        = gain * pan_l
//! coeff_r        = gain * pan_r
//! ```
//!
//! Control-path changes only move the *target* coefficients. During
//! [`MixBus::add_mix`] the current coefficients step toward their targets by a
//! fixed increment per sample, so a fader jump becomes a short ramp instead of
//! a click. Ramp position lives in the channel and persists across cycles;
//! only the accumulator is cleared each cycle.
//!
//! # Cycle protocol
//!
//! ```text
//! add_mix(ch, buf)  for every contributing channel
//! get_mix(l, r)     exactly once (reads and clears), or zero_fill() to discard
//! ```
//!
//! # Example
//!
//! ```rust
//! use tinyrack_core::MixBus;
//!
//! let mut bus = MixBus::new(2, 4, 48000.0);
//! bus.add_mix(0, &[1.0; 4]);
//! bus.add_mix(1, &[0.5; 4]);
//!
//! let (mut l, mut r) = ([0.0; 4], [0.0; 4]);
//! bus.get_mix(&mut l, &mut r);
//! assert!((l[0] - r[0]).abs() < 1e-6); // both channels centered
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::StereoBuffer;
use crate::math::constant_power_pan;
use crate::param::StepRamp;

/// Time for a coefficient to travel the full 0..1 range.
pub const MIX_RAMP_MS: f32 = 20.0;

#[derive(Debug, Clone)]
struct MixChannel {
    gain: f32,
    pan: f32,
    left: StepRamp,
    right: StepRamp,
}

impl MixChannel {
    fn new(step: f32) -> Self {
        let (pan_l, pan_r) = constant_power_pan(0.5);
        Self {
            gain: 1.0,
            pan: 0.5,
            left: StepRamp::new(pan_l, step),
            right: StepRamp::new(pan_r, step),
        }
    }

    fn retarget(&mut self) {
        let (pan_l, pan_r) = constant_power_pan(self.pan);
        self.left.set_target(self.gain * pan_l);
        self.right.set_target(self.gain * pan_r);
    }

    #[inline]
    fn is_settled(&self) -> bool {
        self.left.is_settled() && self.right.is_settled()
    }
}

/// N-channel stereo summing bus.
#[derive(Debug, Clone)]
pub struct MixBus {
    channels: Vec<MixChannel>,
    sum: StereoBuffer,
}

impl MixBus {
    /// Creates a bus with `channels` inputs and room for `capacity` frames per
    /// cycle, ramping over [`MIX_RAMP_MS`] at `sample_rate`.
    ///
    /// Channels start at unity gain, centered.
    pub fn new(channels: usize, capacity: usize, sample_rate: f32) -> Self {
        Self::with_ramp_step(
            channels,
            capacity,
            StepRamp::step_for(sample_rate, MIX_RAMP_MS),
        )
    }

    /// Creates a bus with an explicit per-sample coefficient increment.
    pub fn with_ramp_step(channels: usize, capacity: usize, step: f32) -> Self {
        Self {
            channels: (0..channels).map(|_| MixChannel::new(step)).collect(),
            sum: StereoBuffer::new(capacity),
        }
    }

    /// Number of input channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Frame capacity of the accumulator.
    pub fn capacity(&self) -> usize {
        self.sum.len()
    }

    /// Sets the target gain of one channel, clamped to [0, 1].
    ///
    /// Out-of-range channel indices are ignored.
    pub fn gain(&mut self, ch: usize, gain: f32) {
        if let Some(channel) = self.channels.get_mut(ch) {
            channel.gain = gain.clamp(0.0, 1.0);
            channel.retarget();
        }
    }

    /// Sets the target gain of every channel, clamped to [0, 1].
    pub fn gain_all(&mut self, gain: f32) {
        let gain = gain.clamp(0.0, 1.0);
        for channel in &mut self.channels {
            channel.gain = gain;
            channel.retarget();
        }
    }

    /// Sets the target pan of one channel, clamped to [0, 1] (0 = left).
    ///
    /// Out-of-range channel indices are ignored.
    pub fn pan(&mut self, ch: usize, pan: f32) {
        if let Some(channel) = self.channels.get_mut(ch) {
            channel.pan = pan.clamp(0.0, 1.0);
            channel.retarget();
        }
    }

    /// Configured gain of a channel.
    pub fn channel_gain(&self, ch: usize) -> Option<f32> {
        self.channels.get(ch).map(|c| c.gain)
    }

    /// Configured pan of a channel.
    pub fn channel_pan(&self, ch: usize) -> Option<f32> {
        self.channels.get(ch).map(|c| c.pan)
    }

    /// Current (ramped) `(left, right)` coefficients of a channel.
    pub fn coefficients(&self, ch: usize) -> Option<(f32, f32)> {
        self.channels.get(ch).map(|c| (c.left.get(), c.right.get()))
    }

    /// Target `(left, right)` coefficients of a channel.
    pub fn target_coefficients(&self, ch: usize) -> Option<(f32, f32)> {
        self.channels
            .get(ch)
            .map(|c| (c.left.target(), c.right.target()))
    }

    /// Jumps every channel to its target coefficients.
    ///
    /// Only valid while the output is silent (boot, Muted phase).
    pub fn snap_to_targets(&mut self) {
        for channel in &mut self.channels {
            let (l, r) = (channel.left.target(), channel.right.target());
            channel.left.set_immediate(l);
            channel.right.set_immediate(r);
        }
    }

    /// Scales `input` by the channel's coefficients and accumulates it.
    ///
    /// When the channel's coefficients are settled a fixed-scale loop is
    /// used; otherwise each sample advances the ramp by one step.
    ///
    /// # Panics
    ///
    /// Panics if `input.len()` exceeds the bus capacity.
    pub fn add_mix(&mut self, ch: usize, input: &[f32]) {
        let Some(channel) = self.channels.get_mut(ch) else {
            return;
        };
        let frames = input.len();
        let (sum_l, sum_r) = self.sum.split_mut(frames);

        if channel.is_settled() {
            let (cl, cr) = (channel.left.get(), channel.right.get());
            for ((x, l), r) in input.iter().zip(sum_l.iter_mut()).zip(sum_r.iter_mut()) {
                *l += x * cl;
                *r += x * cr;
            }
        } else {
            for ((x, l), r) in input.iter().zip(sum_l.iter_mut()).zip(sum_r.iter_mut()) {
                *l += x * channel.left.advance();
                *r += x * channel.right.advance();
            }
        }
    }

    /// Copies the accumulated mix into `out_l`/`out_r` and clears the
    /// accumulator.
    ///
    /// # Panics
    ///
    /// Panics if the output length exceeds the bus capacity.
    pub fn get_mix(&mut self, out_l: &mut [f32], out_r: &mut [f32]) {
        let frames = out_l.len().min(out_r.len());
        out_l[..frames].copy_from_slice(&self.sum.left[..frames]);
        out_r[..frames].copy_from_slice(&self.sum.right[..frames]);
        self.sum.clear();
    }

    /// Discards the accumulated mix.
    pub fn zero_fill(&mut self) {
        self.sum.clear();
    }
}
