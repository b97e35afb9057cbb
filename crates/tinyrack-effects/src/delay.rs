//! Feedback delay with damped repeats.

use libm::ceilf;
use tinyrack_core::{DelayLine, Effect, OnePole, SmoothedParam, ms_to_samples};

const MAX_DELAY_MS: f32 = 1000.0;
const MIN_DELAY_MS: f32 = 10.0;
const DAMPING_HZ: f32 = 4000.0;

/// Stereo feedback delay.
///
/// | Index | Name | Mapped range | Default |
/// |-------|------|--------------|---------|
/// | 0 | Time | 10–1000 ms | 300 ms |
/// | 1 | Feedback | 0–90% | 40% |
/// | 2 | Mix | 0–100% | 30% |
#[derive(Debug, Clone)]
pub struct Delay {
    left: DelayLine,
    right: DelayLine,
    damp_left: OnePole,
    damp_right: OnePole,
    /// Delay time in samples, smoothed to avoid zipper noise.
    time: SmoothedParam,
    feedback: f32,
    mix: f32,
    sample_rate: f32,
}

impl Delay {
    /// Number of normalized parameters.
    pub const PARAM_COUNT: usize = 3;

    /// 300 ms delay with light feedback.
    pub fn new(sample_rate: f32) -> Self {
        let max = ceilf(ms_to_samples(MAX_DELAY_MS, sample_rate)) as usize + 2;
        Self {
            left: DelayLine::new(max),
            right: DelayLine::new(max),
            damp_left: OnePole::new(sample_rate, DAMPING_HZ),
            damp_right: OnePole::new(sample_rate, DAMPING_HZ),
            time: SmoothedParam::with_config(ms_to_samples(300.0, sample_rate), sample_rate, 50.0),
            feedback: 0.4,
            mix: 0.3,
            sample_rate,
        }
    }

    /// Set delay time in milliseconds.
    pub fn set_time_ms(&mut self, ms: f32) {
        let ms = ms.clamp(MIN_DELAY_MS, MAX_DELAY_MS);
        self.time.set_target(ms_to_samples(ms, self.sample_rate));
    }

    /// Target delay time in milliseconds.
    pub fn time_ms(&self) -> f32 {
        self.time.target() * 1000.0 / self.sample_rate
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
            0 => self.set_time_ms(MIN_DELAY_MS + value * (MAX_DELAY_MS - MIN_DELAY_MS)),
            1 => self.set_feedback(value * 0.9),
            2 => self.set_mix(value),
            _ => {}
        }
    }
}

impl Effect for Delay {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let time = self.time.advance();

            let wet_l = self.left.read_interpolated(time);
            let wet_r = self.right.read_interpolated(time);
            self.left
                .write(*l + self.damp_left.process(wet_l) * self.feedback);
            self.right
                .write(*r + self.damp_right.process(wet_r) * self.feedback);

            *l += (wet_l - *l) * self.mix;
            *r += (wet_r - *r) * self.mix;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let time_ms = self.time_ms();
        let mut rebuilt = Self::new(sample_rate);
        rebuilt.set_time_ms(time_ms);
        rebuilt.time.snap_to_target();
        rebuilt.feedback = self.feedback;
        rebuilt.mix = self.mix;
        *self = rebuilt;
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.damp_left.reset();
        self.damp_right.reset();
        self.time.snap_to_target();
    }
}
