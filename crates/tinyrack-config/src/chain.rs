//! Serialized effect chain configuration.

use serde::{Deserialize, Serialize};
use tinyrack_effects::{CHAIN_SLOTS, CompressorSettings, EffectChain, EffectType, EqGains};

use crate::error::ConfigError;

/// One selectable slot: effect type by name plus normalized parameters.
///
/// Parameters are applied by index; missing trailing parameters keep the
/// effect's defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSlotConfig {
    /// Effect type name, matched case-insensitively.
    #[serde(rename = "type")]
    pub effect_type: String,

    /// Normalized 0..1 parameter values, in the effect's parameter order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f32>,
}

impl EffectSlotConfig {
    /// Slot for the effect named `effect_type`, with default parameters.
    pub fn new(effect_type: impl Into<String>) -> Self {
        Self {
            effect_type: effect_type.into(),
            params: Vec::new(),
        }
    }

    /// Replaces the parameter list.
    pub fn with_params(mut self, params: impl IntoIterator<Item = f32>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Resolved effect type, if the name is known.
    pub fn kind(&self) -> Option<EffectType> {
        EffectType::from_name(&self.effect_type)
    }
}

/// Compressor stage settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorConfig {
    /// Run this stage.
    pub enabled: bool,
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

impl Default for CompressorConfig {
    fn default() -> Self {
        let settings = CompressorSettings::default();
        Self {
            enabled: false,
            threshold_db: settings.threshold_db,
            ratio: settings.ratio,
            attack_ms: settings.attack_ms,
            release_ms: settings.release_ms,
            makeup_db: settings.makeup_db,
        }
    }
}

impl CompressorConfig {
    /// Settings in the compressor's own type.
    pub fn settings(&self) -> CompressorSettings {
        CompressorSettings {
            threshold_db: self.threshold_db,
            ratio: self.ratio,
            attack_ms: self.attack_ms,
            release_ms: self.release_ms,
            makeup_db: self.makeup_db,
        }
    }
}

/// EQ stage settings.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EqConfig {
    /// Run this stage.
    pub enabled: bool,
    /// Low shelf gain.
    pub low_db: f32,
    /// Mid peak gain.
    pub mid_db: f32,
    /// High shelf gain.
    pub high_db: f32,
}

impl EqConfig {
    /// Gains in the EQ's own type.
    pub fn gains(&self) -> EqGains {
        EqGains {
            low_db: self.low_db,
            mid_db: self.mid_db,
            high_db: self.high_db,
        }
    }
}

/// Full configuration of one [`EffectChain`].
///
/// # TOML Format
///
/// ```toml
/// bypass = false
///
/// [[effects]]
/// type = "chorus"
/// params = [0.3, 0.6, 0.5]
///
/// [[effects]]
/// type = "reverb"
///
/// [compressor]
/// enabled = true
/// threshold_db = -20.0
///
/// [eq]
/// enabled = true
/// low_db = 2.0
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Skip the whole chain.
    pub bypass: bool,
    /// Up to three slots, in processing order.
    pub effects: Vec<EffectSlotConfig>,
    /// Fixed compressor stage.
    pub compressor: CompressorConfig,
    /// Fixed EQ stage, after the compressor.
    pub eq: EqConfig,
}

impl ChainConfig {
    /// Appends an effect slot.
    pub fn with_effect(mut self, effect: EffectSlotConfig) -> Self {
        self.effects.push(effect);
        self
    }

    /// Replaces the whole configuration of `chain`.
    ///
    /// Effect names are resolved before anything is touched, so an unknown
    /// name leaves the chain as it was. Builds effect units, so call it from
    /// the control path.
    pub fn apply(&self, chain: &EffectChain) -> Result<(), ConfigError> {
        let mut kinds = [EffectType::None; CHAIN_SLOTS];
        for (slot, effect) in self.effects.iter().take(CHAIN_SLOTS).enumerate() {
            kinds[slot] = effect
                .kind()
                .ok_or_else(|| ConfigError::UnknownEffect(effect.effect_type.clone()))?;
        }

        chain.clear();
        for (slot, kind) in kinds.into_iter().enumerate() {
            chain.set_slot(slot, kind);
        }
        for (slot, effect) in self.effects.iter().take(CHAIN_SLOTS).enumerate() {
            for (index, value) in effect.params.iter().enumerate() {
                chain.set_slot_param(slot, index, *value);
            }
        }
        chain.set_compressor(self.compressor.enabled, self.compressor.settings());
        chain.set_eq(self.eq.enabled, self.eq.gains());
        chain.set_bypass(self.bypass);
        Ok(())
    }
}
