//! Stereo chorus with quadrature LFOs.

use libm::ceilf;
use tinyrack_core::{DelayLine, Effect, Lfo, SmoothedParam};

const BASE_DELAY_MS: f32 = 15.0;
const MAX_SWING_MS: f32 = 5.0;

/// Chorus effect, one modulated voice per side.
///
/// ## Parameter Indices
///
/// All values are normalized to 0..1.
///
/// | Index | Name | Mapped range | Default |
/// |-------|------|--------------|---------|
/// | 0 | Rate | 0.05–5.0 Hz | 0.8 Hz |
/// | 1 | Depth | 0–100% | 50% |
/// | 2 | Mix | 0–100% | 50% |
///
/// # Example
///
/// ```rust
/// use tinyrack_core::Effect;
/// use tinyrack_effects::Chorus;
///
/// let mut chorus = Chorus::new(48000.0);
/// chorus.set_rate(1.5);
/// chorus.set_depth(0.7);
///
/// let (mut left, mut right) = ([0.25; 64], [0.25; 64]);
/// chorus.process_stereo(&mut left, &mut right);
/// ```
#[derive(Debug, Clone)]
pub struct Chorus {
    left: DelayLine,
    right: DelayLine,
    lfo_left: Lfo,
    lfo_right: Lfo,
    rate: f32,
    depth: SmoothedParam,
    mix: SmoothedParam,
    base_delay: f32,
    swing: f32,
    sample_rate: f32,
}

impl Chorus {
    /// Number of normalized parameters.
    pub const PARAM_COUNT: usize = 3;

    /// Create a new chorus effect.
    pub fn new(sample_rate: f32) -> Self {
        let max_delay = ceilf((BASE_DELAY_MS + MAX_SWING_MS) / 1000.0 * sample_rate) as usize + 2;
        let rate = 0.8;
        Self {
            left: DelayLine::new(max_delay),
            right: DelayLine::new(max_delay),
            lfo_left: Lfo::new(sample_rate, rate, 0.0),
            lfo_right: Lfo::new(sample_rate, rate, 0.25),
            rate,
            depth: SmoothedParam::with_config(0.5, sample_rate, 10.0),
            mix: SmoothedParam::with_config(0.5, sample_rate, 10.0),
            base_delay: BASE_DELAY_MS / 1000.0 * sample_rate,
            swing: MAX_SWING_MS / 1000.0 * sample_rate,
            sample_rate,
        }
    }

    /// Set LFO rate in Hz.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate = rate_hz.clamp(0.05, 5.0);
        self.lfo_left.set_rate(self.rate);
        self.lfo_right.set_rate(self.rate);
    }

    /// Set modulation depth (0-1).
    pub fn set_depth(&mut self, depth: f32) {
        self.depth.set_target(depth.clamp(0.0, 1.0));
    }

    /// Set wet/dry mix (0-1).
    pub fn set_mix(&mut self, mix: f32) {
        self.mix.set_target(mix.clamp(0.0, 1.0));
    }

    /// LFO rate in Hz.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Set a parameter by index from a normalized value.
    pub fn set_param(&mut self, index: usize, value: f32) {
        let value = value.clamp(0.0, 1.0);
        match index {
            0 => self.set_rate(0.05 + value * 4.95),
            1 => self.set_depth(value),
            2 => self.set_mix(value),
            _ => {}
        }
    }
}

impl Effect for Chorus {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let depth = self.depth.advance();
            let mix = self.mix.advance();

            let mod_l = (self.lfo_left.advance() * 0.5 + 0.5) * depth * self.swing;
            let mod_r = (self.lfo_right.advance() * 0.5 + 0.5) * depth * self.swing;

            let wet_l = self.left.read_interpolated(self.base_delay + mod_l);
            let wet_r = self.right.read_interpolated(self.base_delay + mod_r);
            self.left.write(*l);
            self.right.write(*r);

            *l += (wet_l - *l) * mix;
            *r += (wet_r - *r) * mix;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        let mut rebuilt = Self::new(sample_rate);
        rebuilt.set_rate(self.rate);
        rebuilt.depth.set_immediate(self.depth.target());
        rebuilt.mix.set_immediate(self.mix.target());
        *self = rebuilt;
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.lfo_left.reset(0.0);
        self.lfo_right.reset(0.25);
        self.depth.snap_to_target();
        self.mix.snap_to_target();
    }
}
