//! Parameter handling with smoothing for zipper-free changes.
//!
//! Control-path values (gain, pan, volume, effect mix) need smooth transitions
//! to avoid audible steps when they change mid-note. This module provides two
//! smoothers:
//!
//! - [`StepRamp`] - fixed per-sample increment, used by the mix buses and the
//!   master volume ramp. Convergence time is proportional to the distance
//!   travelled, so a small change settles quickly and a full-scale change takes
//!   the whole ramp window.
//! - [`SmoothedParam`] - exponential (one-pole) smoothing, used inside the
//!   built-in effects for their continuous parameters.
//!
//! ## Usage
//!
//! ```rust
//! use tinyrack_core::StepRamp;
//!
//! // Full scale (0 -> 1) in 10 ms at 48 kHz
//! let mut volume = StepRamp::with_ramp_time(0.0, 48000.0, 10.0);
//! volume.set_target(1.0);
//!
//! for _ in 0..480 {
//!     let _scale = volume.advance();
//! }
//! assert!(volume.is_settled());
//! ```

use libm::{ceilf, expf};

/// A value that moves toward its target by a fixed increment per sample.
///
/// The ramp never overshoots: the final step lands exactly on the target,
/// and the number of steps is `ceil(|target - current| / step)`.
#[derive(Debug, Clone)]
pub struct StepRamp {
    current: f32,
    target: f32,
    /// Absolute increment per sample (always > 0).
    step: f32,
    /// Steps left until `current == target`.
    remaining: u32,
}

impl StepRamp {
    /// Create a ramp with an explicit per-sample increment.
    ///
    /// A non-positive `step` makes every change instantaneous.
    pub fn new(initial: f32, step: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: if step > 0.0 { step } else { f32::INFINITY },
            remaining: 0,
        }
    }

    /// Create a ramp that covers a distance of 1.0 in `ramp_ms` milliseconds.
    pub fn with_ramp_time(initial: f32, sample_rate: f32, ramp_ms: f32) -> Self {
        Self::new(initial, Self::step_for(sample_rate, ramp_ms))
    }

    /// Per-sample increment that covers a distance of 1.0 in `ramp_ms`.
    pub fn step_for(sample_rate: f32, ramp_ms: f32) -> f32 {
        let samples = ramp_ms / 1000.0 * sample_rate;
        if samples <= 1.0 { 1.0 } else { 1.0 / samples }
    }

    /// Set a new target; the ramp starts from the current value.
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        let distance = (target - self.current).abs();
        if distance == 0.0 {
            self.remaining = 0;
        } else if self.step.is_infinite() {
            self.current = target;
            self.remaining = 0;
        } else {
            // Tolerance keeps f32 noise in `1 / step` from adding a step.
            self.remaining = ceilf(distance / self.step - 1e-3).max(1.0) as u32;
        }
    }

    /// Jump to `value` without ramping.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.remaining = 0;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.current = self.target;
            } else if self.current < self.target {
                self.current = (self.current + self.step).min(self.target);
            } else {
                self.current = (self.current - self.step).max(self.target);
            }
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Per-sample increment.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// True once the current value equals the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.remaining == 0
    }

    /// Samples left until the ramp settles.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

/// A parameter with exponential smoothing (one-pole lowpass).
///
/// Provides natural-sounding transitions for continuous effect parameters.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    /// Smoothing coefficient (1 = instant, ~0 = very slow)
    coeff: f32,
}

impl SmoothedParam {
    /// Create a smoothed parameter.
    ///
    /// # Arguments
    /// * `initial` - Initial parameter value
    /// * `sample_rate` - Sample rate in Hz
    /// * `smoothing_time_ms` - Time constant in milliseconds (0 = instant)
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self {
            current: initial,
            target: initial,
            coeff: 1.0,
        };
        param.configure(sample_rate, smoothing_time_ms);
        param
    }

    /// Recalculate the coefficient: `coeff = 1 - exp(-1 / (tau * sample_rate))`.
    pub fn configure(&mut self, sample_rate: f32, smoothing_time_ms: f32) {
        if smoothing_time_ms <= 0.0 || sample_rate <= 0.0 {
            self.coeff = 1.0;
        } else {
            let samples = smoothing_time_ms / 1000.0 * sample_rate;
            self.coeff = 1.0 - expf(-1.0 / samples);
        }
    }

    /// Set the target value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and snap to it.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Get the next smoothed value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// Skip ahead to the target value.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }
}
