//! Fixed three-band EQ stage: low shelf, mid peak, high shelf.

use tinyrack_core::{
    Biquad, Effect, high_shelf_coefficients, low_shelf_coefficients, peaking_coefficients,
};

const LOW_HZ: f32 = 200.0;
const MID_HZ: f32 = 1000.0;
const MID_Q: f32 = 0.7;
const HIGH_HZ: f32 = 5000.0;
const MAX_GAIN_DB: f32 = 12.0;

/// Band gains in dB, each clamped to ±12.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EqGains {
    /// Low shelf gain.
    pub low_db: f32,
    /// Mid peak gain.
    pub mid_db: f32,
    /// High shelf gain.
    pub high_db: f32,
}

#[derive(Debug, Clone)]
struct Bands {
    low: Biquad,
    mid: Biquad,
    high: Biquad,
}

impl Bands {
    fn new() -> Self {
        Self {
            low: Biquad::new(),
            mid: Biquad::new(),
            high: Biquad::new(),
        }
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        self.high.process(self.mid.process(self.low.process(x)))
    }

    fn clear(&mut self) {
        self.low.clear();
        self.mid.clear();
        self.high.clear();
    }
}

/// Fixed EQ stage of an effect chain. Disabled by default.
#[derive(Debug, Clone)]
pub struct ThreeBandEq {
    gains: EqGains,
    enabled: bool,
    left: Bands,
    right: Bands,
    sample_rate: f32,
}

impl ThreeBandEq {
    /// Disabled EQ with flat gains.
    pub fn new(sample_rate: f32) -> Self {
        let mut eq = Self {
            gains: EqGains::default(),
            enabled: false,
            left: Bands::new(),
            right: Bands::new(),
            sample_rate,
        };
        eq.update_coefficients();
        eq
    }

    /// True when the stage processes audio.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A disabled EQ passes audio through untouched.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Gains after clamping.
    pub fn gains(&self) -> EqGains {
        self.gains
    }

    /// Clamps each gain and recomputes the band filters.
    pub fn set_gains(&mut self, gains: EqGains) {
        self.gains = EqGains {
            low_db: gains.low_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB),
            mid_db: gains.mid_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB),
            high_db: gains.high_db.clamp(-MAX_GAIN_DB, MAX_GAIN_DB),
        };
        self.update_coefficients();
    }

    fn update_coefficients(&mut self) {
        let sr = self.sample_rate;
        let low = low_shelf_coefficients(LOW_HZ, self.gains.low_db, sr);
        let mid = peaking_coefficients(MID_HZ, MID_Q, self.gains.mid_db, sr);
        let high = high_shelf_coefficients(HIGH_HZ, self.gains.high_db, sr);
        for bands in [&mut self.left, &mut self.right] {
            bands.low.set_coefficients(low);
            bands.mid.set_coefficients(mid);
            bands.high.set_coefficients(high);
        }
    }
}

impl Effect for ThreeBandEq {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.enabled {
            return;
        }
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l = self.left.process(*l);
            *r = self.right.process(*r);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_gains_pass_dc() {
        let mut eq = ThreeBandEq::new(48000.0);
        eq.set_enabled(true);
        let mut left = vec![0.5; 4800];
        let mut right = vec![0.5; 4800];
        eq.process_stereo(&mut left, &mut right);
        assert!((left[4799] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn low_shelf_boosts_dc() {
        let mut eq = ThreeBandEq::new(48000.0);
        eq.set_enabled(true);
        eq.set_gains(EqGains {
            low_db: 6.0,
            ..EqGains::default()
        });
        let mut left = vec![0.25; 9600];
        let mut right = vec![0.25; 9600];
        eq.process_stereo(&mut left, &mut right);
        let expected = 0.25 * tinyrack_core::db_to_linear(6.0);
        assert!((left[9599] - expected).abs() < 0.01, "got {}", left[9599]);
    }

    #[test]
    fn gains_are_clamped() {
        let mut eq = ThreeBandEq::new(48000.0);
        eq.set_gains(EqGains {
            low_db: 40.0,
            mid_db: -40.0,
            high_db: 3.0,
        });
        assert_eq!(
            eq.gains(),
            EqGains {
                low_db: 12.0,
                mid_db: -12.0,
                high_db: 3.0
            }
        );
    }
}
