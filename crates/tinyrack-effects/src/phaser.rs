//! Four-stage allpass phaser.

use core::f32::consts::PI;
use libm::tanf;
use tinyrack_core::{Effect, Lfo, flush_denormal};

const STAGES: usize = 4;
const MIN_HZ: f32 = 200.0;
const SWEEP_HZ: f32 = 1600.0;

/// First-order allpass: `y[n] = a*x[n] + x[n-1] - a*y[n-1]`.
#[derive(Debug, Clone, Copy, Default)]
struct AllpassStage {
    x1: f32,
    y1: f32,
}

impl AllpassStage {
    #[inline]
    fn process(&mut self, input: f32, a: f32) -> f32 {
        let out = flush_denormal(a * input + self.x1 - a * self.y1);
        self.x1 = input;
        self.y1 = out;
        out
    }
}

/// Phaser with a shared sweep and per-side feedback.
///
/// | Index | Name | Mapped range | Default |
/// |-------|------|--------------|---------|
/// | 0 | Rate | 0.05–5.0 Hz | 0.5 Hz |
/// | 1 | Depth | 0–100% | 70% |
/// | 2 | Feedback | 0–90% | 30% |
/// | 3 | Mix | 0–100% | 50% |
#[derive(Debug, Clone)]
pub struct Phaser {
    lfo: Lfo,
    rate: f32,
    depth: f32,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
    left: [AllpassStage; STAGES],
    right: [AllpassStage; STAGES],
    last_left: f32,
    last_right: f32,
}

impl Phaser {
    /// Number of normalized parameters.
    pub const PARAM_COUNT: usize = 4;

    /// Slow, fairly deep sweep at half mix.
    pub fn new(sample_rate: f32) -> Self {
        let rate = 0.5;
        Self {
            lfo: Lfo::new(sample_rate, rate, 0.0),
            rate,
            depth: 0.7,
            feedback: 0.3,
            mix: 0.5,
            sample_rate,
            left: [AllpassStage::default(); STAGES],
            right: [AllpassStage::default(); STAGES],
            last_left: 0.0,
            last_right: 0.0,
        }
    }

    /// Set sweep rate in Hz.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate = rate_hz.clamp(0.05, 5.0);
        self.lfo.set_rate(self.rate);
    }

    /// Set sweep depth (0-1).
    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth.clamp(0.0, 1.0);
    }

    /// Set feedback amount (0-0.9).
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.9);
    }

    /// Set wet/dry mix (0-1).
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Set a parameter by index from a normalized value.
    pub fn set_param(&mut self, index: usize, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match index {
            0 => self.set_rate(0.05 + value * 4.95),
            1 => self.set_depth(value),
            2 => self.set_feedback(value * 0.9),
            3 => self.set_mix(value),
            _ => {}
        }
    }

    #[inline]
    fn coefficient(&self, sweep: f32) -> f32 {
        let freq = MIN_HZ + sweep * self.depth * SWEEP_HZ;
        let t = tanf(PI * freq / self.sample_rate);
        (t - 1.0) / (t + 1.0)
    }
}

impl Effect for Phaser {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let sweep = self.lfo.advance() * 0.5 + 0.5;
            let a = self.coefficient(sweep);

            let mut wet_l = *l + self.last_left * self.feedback;
            let mut wet_r = *r + self.last_right * self.feedback;
            for stage in &mut self.left {
                wet_l = stage.process(wet_l, a);
            }
            for stage in &mut self.right {
                wet_r = stage.process(wet_r, a);
            }
            self.last_left = wet_l;
            self.last_right = wet_r;

            *l += (wet_l - *l) * self.mix;
            *r += (wet_r - *r) * self.mix;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lfo.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.left = [AllpassStage::default(); STAGES];
        self.right = [AllpassStage::default(); STAGES];
        self.last_left = 0.0;
        self.last_right = 0.0;
        self.lfo.reset(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_finite_with_max_feedback() {
        let mut phaser = Phaser::new(48000.0);
        for i in 0..4 {
            phaser.set_param(i, 1.0);
        }
        let mut left: Vec<f32> = (0..4800).map(|i| libm::sinf(i as f32 * 0.05)).collect();
        let mut right = left.clone();
        phaser.process_stereo(&mut left, &mut right);
        assert!(left.iter().chain(&right).all(|s| s.is_finite() && s.abs() < 20.0));
    }

    #[test]
    fn zero_mix_passes_input_through() {
        let mut phaser = Phaser::new(48000.0);
        phaser.set_mix(0.0);
        let input: Vec<f32> = (0..512).map(|i| libm::sinf(i as f32 * 0.1)).collect();
        let (mut left, mut right) = (input.clone(), input.clone());
        phaser.process_stereo(&mut left, &mut right);
        assert_eq!(left, input);
        assert_eq!(right, input);
    }

    #[test]
    fn allpass_coefficient_in_unit_range() {
        let phaser = Phaser::new(48000.0);
        for sweep in [0.0, 0.5, 1.0] {
            let a = phaser.coefficient(sweep);
            assert!(a.abs() < 1.0);
        }
    }
}
