//! Soft-clipping overdrive with a tone control.

use tinyrack_core::{Effect, OnePole, SmoothedParam, soft_clip};

/// Overdrive: gain, tanh saturation, one-pole tone filter, output level.
///
/// | Index | Name | Mapped range | Default |
/// |-------|------|--------------|---------|
/// | 0 | Drive | 1–25x | 4x |
/// | 1 | Tone | 800–8000 Hz | 3000 Hz |
/// | 2 | Level | 0–100% | 50% |
#[derive(Debug, Clone)]
pub struct Overdrive {
    drive: SmoothedParam,
    level: SmoothedParam,
    tone_hz: f32,
    tone_left: OnePole,
    tone_right: OnePole,
}

impl Overdrive {
    /// Number of normalized parameters.
    pub const PARAM_COUNT: usize = 3;

    /// Moderate drive with the tone filter at 3 kHz.
    pub fn new(sample_rate: f32) -> Self {
        let tone_hz = 3000.0;
        Self {
            drive: SmoothedParam::with_config(4.0, sample_rate, 10.0),
            level: SmoothedParam::with_config(0.5, sample_rate, 10.0),
            tone_hz,
            tone_left: OnePole::new(sample_rate, tone_hz),
            tone_right: OnePole::new(sample_rate, tone_hz),
        }
    }

    /// Set input gain (1-25).
    pub fn set_drive(&mut self, drive: f32) {
        self.drive.set_target(drive.clamp(1.0, 25.0));
    }

    /// Set tone filter cutoff in Hz.
    pub fn set_tone(&mut self, hz: f32) {
        self.tone_hz = hz.clamp(800.0, 8000.0);
        self.tone_left.set_frequency(self.tone_hz);
        self.tone_right.set_frequency(self.tone_hz);
    }

    /// Set output level (0-1).
    pub fn set_level(&mut self, level: f32) {
        self.level.set_target(level.clamp(0.0, 1.0));
    }

    /// Set a parameter by index from a normalized value.
    pub fn set_param(&mut self, index: usize, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match index {
            0 => self.set_drive(1.0 + value * 24.0),
            1 => self.set_tone(800.0 + value * 7200.0),
            2 => self.set_level(value),
            _ => {}
        }
    }
}

impl Effect for Overdrive {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let drive = self.drive.advance();
            let level = self.level.advance();
            *l = self.tone_left.process(soft_clip(*l * drive)) * level;
            *r = self.tone_right.process(soft_clip(*r * drive)) * level;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.drive.configure(sample_rate, 10.0);
        self.level.configure(sample_rate, 10.0);
        self.tone_left.set_sample_rate(sample_rate);
        self.tone_right.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.tone_left.reset();
        self.tone_right.reset();
        self.drive.snap_to_target();
        self.level.snap_to_target();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_bounded_by_level() {
        let mut od = Overdrive::new(48000.0);
        od.set_param(0, 1.0);
        let mut left = [10.0; 256];
        let mut right = [-10.0; 256];
        od.process_stereo(&mut left, &mut right);
        assert!(left.iter().all(|s| *s <= 0.5 + 1e-6));
        assert!(right.iter().all(|s| *s >= -0.5 - 1e-6));
    }

    #[test]
    fn silence_stays_silent() {
        let mut od = Overdrive::new(48000.0);
        let mut left = [0.0; 16];
        let mut right = [0.0; 16];
        od.process_stereo(&mut left, &mut right);
        assert_eq!(left, [0.0; 16]);
        assert_eq!(right, [0.0; 16]);
    }
}
