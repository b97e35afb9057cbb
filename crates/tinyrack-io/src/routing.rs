//! Send-effect buses.
//!
//! Every tone generator feeds each send bus at its own send level. Once per
//! cycle the bus mix runs through the bus's effect chain and is added to the
//! master at the bus's return level:
//!
//! ```text
//! slot k ──(volume·send[b], pan)──▶ bus b mix ──▶ chain b ──(return b)──▶ master
//! ```
//!
//! A bus whose return level is exactly zero is skipped entirely: nothing is
//! mixed into it and its chain is not run.

use std::sync::Arc;

use tinyrack_core::{MixBus, StereoBuffer};
use tinyrack_effects::EffectChain;

/// One send bus: summing bus, effect chain, return level.
#[derive(Debug)]
pub struct SendEffectBus {
    mix: MixBus,
    chain: Arc<EffectChain>,
    return_level: f32,
    output: StereoBuffer,
}

impl SendEffectBus {
    /// Creates a silent bus: every channel's send gain at zero, return at
    /// zero, empty chain.
    pub fn new(channels: usize, capacity: usize, sample_rate: f32) -> Self {
        let mut mix = MixBus::new(channels, capacity, sample_rate);
        mix.gain_all(0.0);
        mix.snap_to_targets();
        Self {
            mix,
            chain: Arc::new(EffectChain::new(sample_rate)),
            return_level: 0.0,
            output: StereoBuffer::new(capacity),
        }
    }

    /// The bus's chain, shared with the control path.
    pub fn chain(&self) -> &Arc<EffectChain> {
        &self.chain
    }

    /// Level the bus returns into the master, 0..1.
    pub fn return_level(&self) -> f32 {
        self.return_level
    }

    /// Sets the return level, clamped to [0, 1].
    pub fn set_return_level(&mut self, level: f32) {
        self.return_level = level.clamp(0.0, 1.0);
    }

    /// True when the bus takes part in the cycle.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.return_level > 0.0
    }

    /// Slot sum feeding the chain.
    pub fn mix(&self) -> &MixBus {
        &self.mix
    }

    /// Mutable access to the slot sum.
    pub fn mix_mut(&mut self) -> &mut MixBus {
        &mut self.mix
    }

    /// Accumulates one channel into the bus. No-op while inactive.
    #[inline]
    pub fn add_mix(&mut self, ch: usize, input: &[f32]) {
        if self.is_active() {
            self.mix.add_mix(ch, input);
        }
    }

    /// Runs the bus for one cycle and adds its output to `master`.
    ///
    /// Returns false when the bus was skipped.
    pub fn render_into(&mut self, master: &mut StereoBuffer, frames: usize) -> bool {
        if !self.is_active() {
            return false;
        }

        let (left, right) = self.output.split_mut(frames);
        self.mix.get_mix(left, right);
        if !self.chain.is_bypassed() {
            self.chain.process(left, right);
        }
        master.accumulate_scaled(&self.output, self.return_level, frames);
        true
    }

    /// Clears the chain's state and the bus accumulator, and jumps the send
    /// gains to their targets. Only call while the output is muted.
    pub fn reset(&mut self) {
        self.chain.reset();
        self.mix.zero_fill();
        self.mix.snap_to_targets();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyrack_effects::EffectType;

    #[test]
    fn zero_return_skips_bus_and_chain() {
        let mut bus = SendEffectBus::new(2, 16, 48000.0);
        bus.mix_mut().gain(0, 1.0);
        bus.mix_mut().snap_to_targets();
        bus.add_mix(0, &[1.0; 16]);

        let mut master = StereoBuffer::new(16);
        assert!(!bus.render_into(&mut master, 16));
        assert_eq!(bus.chain().process_calls(), 0);
        assert_eq!(master.peak(16), 0.0);
    }

    #[test]
    fn return_level_scales_output() {
        let mut bus = SendEffectBus::new(1, 8, 48000.0);
        bus.set_return_level(0.5);
        bus.mix_mut().gain(0, 1.0);
        bus.mix_mut().pan(0, 0.0);
        bus.mix_mut().snap_to_targets();
        bus.add_mix(0, &[1.0; 8]);

        let mut master = StereoBuffer::new(8);
        assert!(bus.render_into(&mut master, 8));
        assert_eq!(bus.chain().process_calls(), 1);
        assert!((master.left[0] - 0.5).abs() < 1e-6);
        assert!(master.right[0].abs() < 1e-6);
    }

    #[test]
    fn bypassed_chain_is_not_run() {
        let mut bus = SendEffectBus::new(1, 8, 48000.0);
        bus.set_return_level(1.0);
        bus.chain().set_slot(0, EffectType::Overdrive);
        bus.chain().set_bypass(true);
        let mut master = StereoBuffer::new(8);
        assert!(bus.render_into(&mut master, 8));
        assert_eq!(bus.chain().process_calls(), 0);
    }

    #[test]
    fn return_level_is_clamped() {
        let mut bus = SendEffectBus::new(1, 8, 48000.0);
        bus.set_return_level(3.0);
        assert_eq!(bus.return_level(), 1.0);
        bus.set_return_level(-1.0);
        assert!(!bus.is_active());
    }
}
