//! Core Effect trait.
//!
//! The render core treats every effect as an opaque, in-place stereo
//! processor. Send buses and the master chain call [`Effect::process_stereo`]
//! once per cycle on their own buffers.
//!
//! ## Design Decisions
//!
//! - **Stereo, in place**: the chain operates on the bus's left/right
//!   accumulators directly, no extra copy per stage.
//! - **No allocations**: `process_stereo` and `reset` run on the render path
//!   and must not allocate.
//! - **Reset only while silent**: [`Effect::reset`] is invoked by the engine
//!   during the Muted phase of a performance switch, never mid-signal.

/// Core trait for all effects.
///
/// # Example
///
/// ```rust
/// use tinyrack_core::Effect;
///
/// struct Trim {
///     gain: f32,
/// }
///
/// impl Effect for Trim {
///     fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
///         for s in left.iter_mut().chain(right.iter_mut()) {
///             *s *= self.gain;
///         }
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
/// ```
pub trait Effect {
    /// Process a block of stereo samples in place.
    ///
    /// `left` and `right` always have the same length (the cycle's frame
    /// count).
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]);

    /// Update the sample rate and recalculate rate-dependent coefficients.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state (delay lines, filter history) without changing
    /// parameters.
    fn reset(&mut self);
}
