//! Built-in test tone generator.
//!
//! Stands in for the synthesis engine when rendering from the command line:
//! one fixed-pitch oscillator per slot.

use clap::ValueEnum;
use libm::{floorf, powf, sinf};
use tinyrack_core::ToneGenerator;

/// Waveform types for CLI
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
    Saw,
    Square,
}

/// Convert a MIDI note number to frequency in Hz (A4 = 69 = 440 Hz).
pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * powf(2.0, (f32::from(note) - 69.0) / 12.0)
}

/// Fixed-pitch oscillator.
#[derive(Debug, Clone)]
pub struct TestTone {
    waveform: Waveform,
    phase: f32,
    increment: f32,
    level: f32,
}

impl TestTone {
    /// Oscillator at `freq_hz`, with `level` clamped to [0, 1].
    pub fn new(waveform: Waveform, freq_hz: f32, sample_rate: f32, level: f32) -> Self {
        Self {
            waveform,
            phase: 0.0,
            increment: freq_hz / sample_rate,
            level: level.clamp(0.0, 1.0),
        }
    }

    #[inline]
    fn sample(&self) -> f32 {
        let p = self.phase;
        match self.waveform {
            Waveform::Sine => sinf(p * core::f32::consts::TAU),
            Waveform::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
            Waveform::Saw => 2.0 * p - 1.0,
            Waveform::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

impl ToneGenerator for TestTone {
    fn render(&mut self, out: &mut [f32]) {
        for s in out {
            *s = self.sample() * self.level;
            self.phase += self.increment;
            self.phase -= floorf(self.phase);
        }
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// One tone per slot, stacked in a repeating major-seventh voicing above
/// `base_note`.
pub fn chord(
    slots: usize,
    base_note: u8,
    waveform: Waveform,
    sample_rate: f32,
) -> Vec<TestTone> {
    const VOICING: [u8; 4] = [0, 4, 7, 11];
    (0..slots)
        .map(|i| {
            let octave = (i / VOICING.len()) as u8 * 12;
            let note = base_note
                .saturating_add(octave)
                .saturating_add(VOICING[i % VOICING.len()])
                .min(127);
            TestTone::new(waveform, midi_to_freq(note), sample_rate, 0.25)
        })
        .collect()
}
