//! Stereo-linked feed-forward compressor.
//!
//! The detector follows the louder of the two channels, so both sides always
//! receive the same gain and the stereo image stays put.
//!
//! ```text
//! env      = peak follower(max(|L|, |R|))       attack / release
//! over_db  = env_db - threshold_db
//! gain_db  = over_db > 0 ? -over_db * (1 - 1/ratio) : 0
//! out      = in * db_to_linear(gain_db + makeup_db)
//! ```

use libm::expf;
use tinyrack_core::{Effect, db_to_linear, flush_denormal, linear_to_db};

/// Compressor settings in natural units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    /// Level above which gain reduction starts.
    pub threshold_db: f32,
    /// Input to output ratio above the threshold.
    pub ratio: f32,
    /// Envelope rise time.
    pub attack_ms: f32,
    /// Envelope fall time.
    pub release_ms: f32,
    /// Gain added after compression.
    pub makeup_db: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: -18.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            makeup_db: 0.0,
        }
    }
}

/// Fixed compressor stage of an effect chain. Disabled by default.
#[derive(Debug, Clone)]
pub struct Compressor {
    settings: CompressorSettings,
    enabled: bool,
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
}

fn time_coeff(ms: f32, sample_rate: f32) -> f32 {
    let samples = ms / 1000.0 * sample_rate;
    if samples <= 0.0 {
        0.0
    } else {
        expf(-1.0 / samples)
    }
}

impl Compressor {
    /// Disabled compressor with default settings.
    pub fn new(sample_rate: f32) -> Self {
        let mut comp = Self {
            settings: CompressorSettings::default(),
            enabled: false,
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
        };
        comp.set_settings(CompressorSettings::default());
        comp
    }

    /// True when the stage processes audio.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A disabled compressor passes audio through untouched.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Settings after clamping.
    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    /// Applies new settings, clamping each to its usable range.
    pub fn set_settings(&mut self, settings: CompressorSettings) {
        self.settings = CompressorSettings {
            threshold_db: settings.threshold_db.clamp(-60.0, 0.0),
            ratio: settings.ratio.clamp(1.0, 20.0),
            attack_ms: settings.attack_ms.clamp(0.1, 200.0),
            release_ms: settings.release_ms.clamp(5.0, 2000.0),
            makeup_db: settings.makeup_db.clamp(0.0, 24.0),
        };
        self.attack_coeff = time_coeff(self.settings.attack_ms, self.sample_rate);
        self.release_coeff = time_coeff(self.settings.release_ms, self.sample_rate);
    }

    /// Gain reduction in dB (<= 0) for the current envelope.
    pub fn gain_reduction_db(&self) -> f32 {
        let over = linear_to_db(self.envelope) - self.settings.threshold_db;
        if over > 0.0 {
            -over * (1.0 - 1.0 / self.settings.ratio)
        } else {
            0.0
        }
    }
}

impl Effect for Compressor {
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.enabled {
            return;
        }
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let level = l.abs().max(r.abs());
            let coeff = if level > self.envelope {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.envelope = flush_denormal(level + coeff * (self.envelope - level));

            let gain = db_to_linear(self.gain_reduction_db() + self.settings.makeup_db);
            *l *= gain;
            *r *= gain;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.set_settings(self.settings);
    }

    fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
