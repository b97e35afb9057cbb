//! Performance: the switchable per-slot and per-bus parameter set.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chain::ChainConfig;
use crate::error::{ConfigError, load_toml, save_toml};
use crate::validation::{ValidationResult, validate_performance};

/// Mixer parameters of one tone generator slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Linear volume, 0..1.
    pub volume: f32,
    /// Pan position, 0 = left, 0.5 = center, 1 = right.
    pub pan: f32,
    /// Send level per bus, 0..1. Missing buses send nothing.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sends: Vec<f32>,
    /// MIDI channel 0..15 the slot listens on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_channel: Option<u8>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.5,
            sends: Vec::new(),
            midi_channel: None,
        }
    }
}

impl SlotConfig {
    /// Send level for `bus`, zero when not configured.
    pub fn send(&self, bus: usize) -> f32 {
        self.sends.get(bus).copied().unwrap_or(0.0)
    }
}

/// One send bus: its return level and its chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendBusConfig {
    /// Return level into the master, 0..1. Zero skips the bus entirely.
    pub return_level: f32,
    /// Effects run on the bus before the return.
    pub chain: ChainConfig,
}

/// A complete performance.
///
/// # TOML Format
///
/// ```toml
/// name = "Strings and pad"
///
/// [[slots]]
/// volume = 0.8
/// pan = 0.3
/// sends = [0.4]
/// midi_channel = 0
///
/// [[send_buses]]
/// return_level = 0.6
/// [[send_buses.chain.effects]]
/// type = "reverb"
/// params = [0.8, 0.4, 1.0]
///
/// [master.eq]
/// enabled = true
/// high_db = 1.5
/// ```
///
/// Slots beyond `slots`, and buses beyond `send_buses`, take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    /// Display name.
    pub name: String,

    /// Free-form note shown by tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Per-slot routing, in slot order.
    #[serde(default)]
    pub slots: Vec<SlotConfig>,

    /// Send buses, in bus order.
    #[serde(default)]
    pub send_buses: Vec<SendBusConfig>,

    /// Chain on the summed master bus.
    #[serde(default)]
    pub master: ChainConfig,
}

impl Default for Performance {
    fn default() -> Self {
        Self::new("Init")
    }
}

impl Performance {
    /// Create an empty performance: every slot and bus at defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            slots: Vec::new(),
            send_buses: Vec::new(),
            master: ChainConfig::default(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends settings for the next slot.
    pub fn with_slot(mut self, slot: SlotConfig) -> Self {
        self.slots.push(slot);
        self
    }

    /// Appends settings for the next send bus.
    pub fn with_send_bus(mut self, bus: SendBusConfig) -> Self {
        self.send_buses.push(bus);
        self
    }

    /// Replaces the master chain.
    pub fn with_master(mut self, master: ChainConfig) -> Self {
        self.master = master;
        self
    }

    /// Settings for slot `index`, defaults when not listed.
    pub fn slot(&self, index: usize) -> SlotConfig {
        self.slots.get(index).cloned().unwrap_or_default()
    }

    /// Settings for send bus `index`, defaults when not listed.
    pub fn send_bus(&self, index: usize) -> SendBusConfig {
        self.send_buses.get(index).cloned().unwrap_or_default()
    }

    /// Load a performance from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_toml(path.as_ref())
    }

    /// Load a performance from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the performance to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        save_toml(self, path.as_ref())
    }

    /// Convert the performance to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every level and every effect name, collecting all violations.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_performance(self)
    }
}
