//! Small Schroeder reverb: parallel damped combs into series allpasses.
//!
//! ```text
//! in ──┬─▶ comb 1 ─┐
//!      ├─▶ comb 2 ─┤
//!      ├─▶ comb 3 ─┼─▶ allpass 1 ─▶ allpass 2 ─▶ wet
//!      └─▶ comb 4 ─┘
//! ```
//!
//! Tunings are the classic Freeverb values at 44.1 kHz, scaled to the running
//! sample rate. The right channel is offset by a small spread for width.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use tinyrack_core::{DelayLine, Effect, flush_denormal};

const REFERENCE_RATE: f32 = 44100.0;
const COMB_TUNING: [usize; 4] = [1116, 1188, 1277, 1356];
const ALLPASS_TUNING: [usize; 2] = [556, 441];
const STEREO_SPREAD: usize = 23;
const INPUT_GAIN: f32 = 0.015;
const ALLPASS_FEEDBACK: f32 = 0.5;

#[derive(Debug, Clone)]
struct Comb {
    line: DelayLine,
    delay: usize,
    store: f32,
}

impl Comb {
    fn new(delay: usize) -> Self {
        Self {
            line: DelayLine::new(delay),
            delay,
            store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let out = self.line.read(self.delay);
        self.store = flush_denormal(out * (1.0 - damp) + self.store * damp);
        self.line.write(input + self.store * feedback);
        out
    }

    fn clear(&mut self) {
        self.line.clear();
        self.store = 0.0;
    }
}

#[derive(Debug, Clone)]
struct Allpass {
    line: DelayLine,
    delay: usize,
}

impl Allpass {
    fn new(delay: usize) -> Self {
        Self {
            line: DelayLine::new(delay),
            delay,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.line.read(self.delay);
        self.line.write(input + buffered * ALLPASS_FEEDBACK);
        buffered - input
    }
}

#[derive(Debug, Clone)]
struct Tank {
    combs: Vec<Comb>,
    allpasses: Vec<Allpass>,
}

impl Tank {
    fn new(sample_rate: f32, spread: usize) -> Self {
        let scale = |n: usize| (((n + spread) as f32 * sample_rate / REFERENCE_RATE) as usize).max(1);
        Self {
            combs: COMB_TUNING.iter().map(|&n| Comb::new(scale(n))).collect(),
            allpasses: ALLPASS_TUNING
                .iter()
                .map(|&n| Allpass::new(scale(n)))
                .collect(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let mut out = 0.0;
        for comb in &mut self.combs {
            out += comb.process(input, feedback, damp);
        }
        for allpass in &mut self.allpasses {
            out = allpass.process(out);
        }
        out
    }

    fn clear(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.line.clear();
        }
    }
}

/// Stereo reverb.
///
/// | Index | Name | Mapped range | Default |
/// |-------|------|--------------|---------|
/// | 0 | Size | comb feedback 0.70–0.98 | 0.84 |
/// | 1 | Damping | 0–40% | 20% |
/// | 2 | Mix | 0–100% | 30% |
#[derive(Debug, Clone)]
pub struct Reverb {
    left: Tank,
    right: Tank,
    feedback: f32,
    damp: f32,
    mix: f32,
}

impl Reverb {
    /// Number of normalized parameters.
    pub const PARAM_COUNT: usize = 3;

    /// Medium room, 30% wet.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            left: Tank::new(sample_rate, 0),
            right: Tank::new(sample_rate, STEREO_SPREAD),
            feedback: 0.84,
            damp: 0.2,
            mix: 0.3,
        }
    }

    /// Set room size (0-1).
    pub fn set_size(&mut self, size: f32) {
        self.feedback = 0.7 + size.clamp(0.0, 1.0) * 0.28;
    }

    /// Set HF damping (0-1).
    pub fn set_damping(&mut self, damping: f32) {
        self.damp = damping.clamp(0.0, 1.0) * 0.4;
    }

    /// Set wet/dry mix (0-1).
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = mix.clamp(0.0, 1.0);
    }

    /// Set a parameter by index from a normalized value.
    pub fn set_param(&mut self, index: usize, value: f32) {
        match index {
            0 => self.set_size(value),
            1 => self.set_damping(value),
            2 => self.set_mix(value),
            _ => {}
        }
    }
}

impl Effect for Reverb {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let input = (*l + *r) * INPUT_GAIN;
            let wet_l = self.left.process(input, self.feedback, self.damp);
            let wet_r = self.right.process(input, self.feedback, self.damp);
            *l = *l * (1.0 - self.mix) + wet_l * self.mix;
            *r = *r * (1.0 - self.mix) + wet_r * self.mix;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.left = Tank::new(sample_rate, 0);
        self.right = Tank::new(sample_rate, STEREO_SPREAD);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}
