//! Low-frequency oscillator for modulated effects.

use core::f32::consts::TAU;
use libm::{floorf, sinf};

/// Sine LFO with a phase offset, producing values in [-1, 1].
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    increment: f32,
    sample_rate: f32,
    rate_hz: f32,
}

impl Lfo {
    /// Creates an LFO at `rate_hz`, starting at `phase` (0..1 turns).
    pub fn new(sample_rate: f32, rate_hz: f32, phase: f32) -> Self {
        Self {
            phase: phase - floorf(phase),
            increment: rate_hz / sample_rate,
            sample_rate,
            rate_hz,
        }
    }

    /// Sets the rate in Hz.
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate_hz = rate_hz;
        self.increment = rate_hz / self.sample_rate;
    }

    /// Updates the sample rate, keeping the rate in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_rate(self.rate_hz);
    }

    /// Returns the next value and advances the phase.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let out = sinf(self.phase * TAU);
        self.phase += self.increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    /// Resets the phase.
    pub fn reset(&mut self, phase: f32) {
        self.phase = phase - floorf(phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_bounded() {
        let mut lfo = Lfo::new(48000.0, 5.0, 0.0);
        for _ in 0..48000 {
            let v = lfo.advance();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn quarter_phase_starts_at_peak() {
        let mut lfo = Lfo::new(48000.0, 1.0, 0.25);
        assert!((lfo.advance() - 1.0).abs() < 1e-6);
    }
}
