//! First-order lowpass used for tone shaping and feedback damping.

use libm::expf;

use crate::math::flush_denormal;

/// 6 dB/oct lowpass: `y += a * (x - y)` with `a = 1 - e^(-2π·fc/fs)`.
#[derive(Debug, Clone)]
pub struct OnePole {
    y: f32,
    a: f32,
    cutoff: f32,
    sample_rate: f32,
}

impl OnePole {
    /// Filter with cutoff `cutoff_hz` and a cleared state.
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            y: 0.0,
            a: smoothing(cutoff_hz, sample_rate),
            cutoff: cutoff_hz,
            sample_rate,
        }
    }

    /// Moves the cutoff, clamped to Nyquist.
    pub fn set_frequency(&mut self, cutoff_hz: f32) {
        self.cutoff = cutoff_hz;
        self.a = smoothing(cutoff_hz, self.sample_rate);
    }

    /// Recomputes the coefficient for a new rate, keeping the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.a = smoothing(self.cutoff, sample_rate);
    }

    /// Filters one sample.
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.y = flush_denormal(self.y + self.a * (x - self.y));
        self.y
    }

    /// Filters `buf` in place.
    pub fn process_slice(&mut self, buf: &mut [f32]) {
        for s in buf {
            *s = self.process(*s);
        }
    }

    /// Clears the filter state.
    pub fn reset(&mut self) {
        self.y = 0.0;
    }
}

fn smoothing(cutoff_hz: f32, sample_rate: f32) -> f32 {
    if sample_rate <= 0.0 {
        return 1.0;
    }
    let nyquist = sample_rate * 0.5;
    1.0 - expf(-core::f32::consts::TAU * cutoff_hz.clamp(0.0, nyquist) / sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_on_dc() {
        let mut lp = OnePole::new(48000.0, 500.0);
        let mut buf = [1.0; 4800];
        lp.process_slice(&mut buf);
        assert!((buf[4799] - 1.0).abs() < 1e-4);
        assert!(buf.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn attenuates_nyquist() {
        let mut lp = OnePole::new(48000.0, 200.0);
        let mut peak = 0.0_f32;
        for i in 0..2000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = lp.process(x);
            if i > 1000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 0.05, "peak {peak}");
    }

    #[test]
    fn reset_forgets_history() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        lp.process(1.0);
        lp.reset();
        assert_eq!(lp.process(0.0), 0.0);
    }
}
