//! Selectable effect variants for the chain slots.
//!
//! The set is small and fixed, so a slot holds a tagged enum and dispatches
//! with a `match` rather than a trait object.

use core::fmt;

use tinyrack_core::Effect;

use crate::{Chorus, Delay, Overdrive, Phaser, Reverb};

/// Identifier stored in a chain slot. `0` is the empty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EffectType {
    /// Empty slot, passes audio through.
    #[default]
    None = 0,
    /// Dual-voice chorus.
    Chorus = 1,
    /// Damped feedback delay.
    Delay = 2,
    /// Soft-clipping drive.
    Overdrive = 3,
    /// Small Schroeder reverb.
    Reverb = 4,
    /// Four-stage allpass phaser.
    Phaser = 5,
}

impl EffectType {
    /// Every type, in id order.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Chorus,
        Self::Delay,
        Self::Overdrive,
        Self::Reverb,
        Self::Phaser,
    ];

    /// Type with wire id `id`.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Wire id of the type.
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Lowercase name used in config files.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Chorus => "chorus",
            Self::Delay => "delay",
            Self::Overdrive => "overdrive",
            Self::Reverb => "reverb",
            Self::Phaser => "phaser",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Number of normalized parameters the variant accepts.
    pub fn param_count(self) -> usize {
        match self {
            Self::None => 0,
            Self::Chorus => Chorus::PARAM_COUNT,
            Self::Delay => Delay::PARAM_COUNT,
            Self::Overdrive => Overdrive::PARAM_COUNT,
            Self::Reverb => Reverb::PARAM_COUNT,
            Self::Phaser => Phaser::PARAM_COUNT,
        }
    }
}

impl fmt::Display for EffectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One effect slot's processor.
#[derive(Debug, Clone, Default)]
pub enum FxUnit {
    /// Empty slot.
    #[default]
    None,
    /// Chorus slot.
    Chorus(Chorus),
    /// Delay slot.
    Delay(Delay),
    /// Overdrive slot.
    Overdrive(Overdrive),
    /// Reverb slot.
    Reverb(Reverb),
    /// Phaser slot.
    Phaser(Phaser),
}

impl FxUnit {
    /// Builds a unit with default parameters. Allocates for the delay-based
    /// variants, so call this off the render path.
    pub fn new(kind: EffectType, sample_rate: f32) -> Self {
        match kind {
            EffectType::None => Self::None,
            EffectType::Chorus => Self::Chorus(Chorus::new(sample_rate)),
            EffectType::Delay => Self::Delay(Delay::new(sample_rate)),
            EffectType::Overdrive => Self::Overdrive(Overdrive::new(sample_rate)),
            EffectType::Reverb => Self::Reverb(Reverb::new(sample_rate)),
            EffectType::Phaser => Self::Phaser(Phaser::new(sample_rate)),
        }
    }

    /// Type of the wrapped effect.
    pub fn kind(&self) -> EffectType {
        match self {
            Self::None => EffectType::None,
            Self::Chorus(_) => EffectType::Chorus,
            Self::Delay(_) => EffectType::Delay,
            Self::Overdrive(_) => EffectType::Overdrive,
            Self::Reverb(_) => EffectType::Reverb,
            Self::Phaser(_) => EffectType::Phaser,
        }
    }

    /// Sets a normalized (0..1) parameter. Unknown indices are ignored.
    pub fn set_param(&mut self, index: usize, value: f32) {
        match self {
            Self::None => {}
            Self::Chorus(fx) => fx.set_param(index, value),
            Self::Delay(fx) => fx.set_param(index, value),
            Self::Overdrive(fx) => fx.set_param(index, value),
            Self::Reverb(fx) => fx.set_param(index, value),
            Self::Phaser(fx) => fx.set_param(index, value),
        }
    }
}

impl Effect for FxUnit {
    #[inline]
    fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        match self {
            Self::None => {}
            Self::Chorus(fx) => fx.process_stereo(left, right),
            Self::Delay(fx) => fx.process_stereo(left, right),
            Self::Overdrive(fx) => fx.process_stereo(left, right),
            Self::Reverb(fx) => fx.process_stereo(left, right),
            Self::Phaser(fx) => fx.process_stereo(left, right),
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        match self {
            Self::None => {}
            Self::Chorus(fx) => fx.set_sample_rate(sample_rate),
            Self::Delay(fx) => fx.set_sample_rate(sample_rate),
            Self::Overdrive(fx) => fx.set_sample_rate(sample_rate),
            Self::Reverb(fx) => fx.set_sample_rate(sample_rate),
            Self::Phaser(fx) => fx.set_sample_rate(sample_rate),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::None => {}
            Self::Chorus(fx) => fx.reset(),
            Self::Delay(fx) => fx.reset(),
            Self::Overdrive(fx) => fx.reset(),
            Self::Reverb(fx) => fx.reset(),
            Self::Phaser(fx) => fx.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for kind in EffectType::ALL {
            assert_eq!(EffectType::from_id(kind.id()), Some(kind));
            assert_eq!(FxUnit::new(kind, 48000.0).kind(), kind);
        }
        assert_eq!(EffectType::from_id(6), None);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(EffectType::from_name("Reverb"), Some(EffectType::Reverb));
        assert_eq!(EffectType::from_name("flanger"), None);
        assert_eq!(EffectType::Phaser.to_string(), "phaser");
    }

    #[test]
    fn empty_unit_is_transparent() {
        let mut unit = FxUnit::None;
        let mut left = [0.3; 8];
        let mut right = [0.4; 8];
        unit.process_stereo(&mut left, &mut right);
        assert_eq!(left, [0.3; 8]);
        assert_eq!(right, [0.4; 8]);
    }
}
