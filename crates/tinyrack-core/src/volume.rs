//! Master volume ramp and mute gate.
//!
//! [`VolumeRamp`] scales the final stereo signal. Level changes are ramped
//! with a fixed per-sample increment (full scale in [`VOLUME_RAMP_MS`]), and
//! the same ramp doubles as the mute gate used for glitch-free performance
//! switching:
//!
//! ```text
//!            request_mute             both scales == 0
//!   Normal ───────────────▶ RampingDown ───────────────▶ Muted
//!     ▲                        │   ▲                       │
//!     │ scale == target        │   │ request_mute          │ request_unmute
//!     │                        ▼   │                       │
//!     └──────────────────── RampingUp ◀────────────────────┘
//!                         (request_unmute)
//! ```
//!
//! While Muted the output is forced to silence, which is the only window in
//! which generator and effect state may be reset.

use crate::param::StepRamp;

/// Time for the scale to travel the full 0..1 range.
pub const VOLUME_RAMP_MS: f32 = 10.0;

/// State of the volume ramp / mute gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeRampState {
    /// Output follows the configured level (possibly ramping toward it).
    Normal,
    /// Ramping toward silence after a mute request.
    RampingDown,
    /// Both channel scales are exactly zero; output is silence.
    Muted,
    /// Ramping back to the configured level after an unmute request.
    RampingUp,
}

/// Master volume controller with click-free mute/unmute.
#[derive(Debug, Clone)]
pub struct VolumeRamp {
    state: VolumeRampState,
    left: StepRamp,
    right: StepRamp,
    /// Configured master level, the target whenever not muting.
    level: f32,
}

impl VolumeRamp {
    /// Creates a ramp at `level` in the Normal state.
    pub fn new(sample_rate: f32, level: f32) -> Self {
        Self::with_step(StepRamp::step_for(sample_rate, VOLUME_RAMP_MS), level)
    }

    /// Creates a ramp with an explicit per-sample increment.
    pub fn with_step(step: f32, level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        Self {
            state: VolumeRampState::Normal,
            left: StepRamp::new(level, step),
            right: StepRamp::new(level, step),
            level,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> VolumeRampState {
        self.state
    }

    /// True only in the Muted state.
    #[inline]
    pub fn is_muted(&self) -> bool {
        self.state == VolumeRampState::Muted
    }

    /// Configured master level.
    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current `(left, right)` scale.
    #[inline]
    pub fn scale(&self) -> (f32, f32) {
        (self.left.get(), self.right.get())
    }

    /// Sets the master level, clamped to [0, 1].
    ///
    /// In Normal and RampingUp the scale ramps toward it. While muting or
    /// muted it only becomes the target for the next unmute.
    pub fn set_master_volume(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
        match self.state {
            VolumeRampState::Normal | VolumeRampState::RampingUp => self.retarget(self.level),
            VolumeRampState::RampingDown | VolumeRampState::Muted => {}
        }
    }

    /// Starts ramping toward silence.
    pub fn request_mute(&mut self) {
        match self.state {
            VolumeRampState::Normal | VolumeRampState::RampingUp => {
                self.state = VolumeRampState::RampingDown;
                self.retarget(0.0);
                self.settle_transitions();
            }
            VolumeRampState::RampingDown | VolumeRampState::Muted => {}
        }
    }

    /// Starts ramping back to the configured level.
    pub fn request_unmute(&mut self) {
        match self.state {
            VolumeRampState::Muted | VolumeRampState::RampingDown => {
                self.state = VolumeRampState::RampingUp;
                self.retarget(self.level);
                self.settle_transitions();
            }
            VolumeRampState::Normal | VolumeRampState::RampingUp => {}
        }
    }

    /// Scales one cycle of stereo output in place.
    ///
    /// Muted output is overwritten with silence.
    pub fn apply(&mut self, left: &mut [f32], right: &mut [f32]) {
        if self.state == VolumeRampState::Muted {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        if self.left.is_settled() && self.right.is_settled() {
            let (sl, sr) = self.scale();
            if sl != 1.0 || sr != 1.0 {
                for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                    *l *= sl;
                    *r *= sr;
                }
            }
        } else {
            for (l, r) in left.iter_mut().zip(right.iter_mut()) {
                *l *= self.left.advance();
                *r *= self.right.advance();
            }
        }

        self.settle_transitions();
    }

    /// Writes one per-sample scale for each frame of `scales`.
    ///
    /// Used by the direct multi-channel output mode, where one scale is
    /// applied to every device channel.
    pub fn advance_block(&mut self, scales: &mut [f32]) {
        if self.state == VolumeRampState::Muted {
            scales.fill(0.0);
            return;
        }
        for s in scales.iter_mut() {
            *s = self.left.advance();
            self.right.advance();
        }
        self.settle_transitions();
    }

    fn retarget(&mut self, target: f32) {
        self.left.set_target(target);
        self.right.set_target(target);
    }

    fn settle_transitions(&mut self) {
        let settled = self.left.is_settled() && self.right.is_settled();
        match self.state {
            VolumeRampState::RampingDown if settled => {
                self.state = VolumeRampState::Muted;
                #[cfg(feature = "tracing")]
                tracing::debug!("volume_ramp: muted");
            }
            VolumeRampState::RampingUp if settled => {
                self.state = VolumeRampState::Normal;
                #[cfg(feature = "tracing")]
                tracing::debug!(level = self.level, "volume_ramp: unmuted");
            }
            _ => {}
        }
    }
}
