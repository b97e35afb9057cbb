//! Boot configuration: the fixed shape of the render engine.
//!
//! Everything here is read once when the engine is built. Buffer sizes,
//! the core partition, and the output format all derive from it, and none of
//! it is re-checked per cycle.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tinyrack_core::{CorePartition, SampleFormat};

use crate::error::{ConfigError, load_toml, save_toml};
use crate::validation::{ValidationResult, validate_boot};

/// How the final signal reaches the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Full bus topology mixed down to one stereo pair.
    #[default]
    Stereo,
    /// One device channel per active tone generator, buses and chains
    /// bypassed.
    Direct,
}

/// Serialized name of a [`SampleFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormatConfig {
    /// 16-bit signed.
    #[default]
    S16,
    /// 24-bit signed in a 32-bit container.
    S24,
    /// 32-bit signed.
    S32,
}

impl From<SampleFormatConfig> for SampleFormat {
    fn from(config: SampleFormatConfig) -> Self {
        match config {
            SampleFormatConfig::S16 => SampleFormat::S16,
            SampleFormatConfig::S24 => SampleFormat::S24,
            SampleFormatConfig::S32 => SampleFormat::S32,
        }
    }
}

/// Boot-time engine configuration.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 48000
/// generators = 16
/// active = 8
/// frames_per_cycle = 128
/// send_buses = 2
/// cores = 4
/// coordinator_share = 2
/// swap_channels = false
/// output_mode = "stereo"
/// sample_format = "s24"
/// queue_frames = 1024
/// master_volume = 0.8
/// soft_clip = false
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Tone generator slots allocated at boot.
    pub generators: usize,
    /// Leading slots enabled at boot.
    pub active: usize,
    /// Frames rendered per cycle.
    pub frames_per_cycle: usize,
    /// Send buses allocated at boot.
    pub send_buses: usize,
    /// Cores rendering tone generators, the coordinator included.
    pub cores: usize,
    /// Generators rendered by the coordinator. Unset splits evenly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator_share: Option<usize>,
    /// Swap left and right when interleaving.
    pub swap_channels: bool,
    /// Stereo bus output or direct per-generator output.
    pub output_mode: OutputMode,
    /// Device sample format.
    pub sample_format: SampleFormatConfig,
    /// Device queue size in frames.
    pub queue_frames: usize,
    /// Master volume at boot, 0..1.
    pub master_volume: f32,
    /// Soft-clip the master bus before conversion.
    pub soft_clip: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            generators: 16,
            active: 16,
            frames_per_cycle: 128,
            send_buses: 2,
            cores: 1,
            coordinator_share: None,
            swap_channels: false,
            output_mode: OutputMode::Stereo,
            sample_format: SampleFormatConfig::S16,
            queue_frames: 1024,
            master_volume: 1.0,
            soft_clip: false,
        }
    }
}

impl BootConfig {
    /// Load a boot configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        load_toml(path.as_ref())
    }

    /// Load a boot configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        save_toml(self, path.as_ref())
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load and validate in one step.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let boot = Self::load(path)?;
        boot.validate()?;
        Ok(boot)
    }

    /// Checks every engine limit, collecting all violations.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_boot(self)
    }

    /// Sample rate as the engine's float type.
    pub fn sample_rate_hz(&self) -> f32 {
        self.sample_rate as f32
    }

    /// Fixed-point format written to the device.
    pub fn format(&self) -> SampleFormat {
        self.sample_format.into()
    }

    /// Device channels written per frame.
    pub fn output_channels(&self) -> usize {
        match self.output_mode {
            OutputMode::Stereo => 2,
            OutputMode::Direct => self.active,
        }
    }

    /// Bytes in one rendered cycle.
    pub fn cycle_bytes(&self) -> usize {
        self.frames_per_cycle * self.output_channels() * self.format().bytes_per_sample()
    }

    /// Generator-to-core assignment for this configuration.
    ///
    /// Without an explicit coordinator share every core gets
    /// `generators / cores`, and the coordinator also takes the remainder.
    pub fn partition(&self) -> CorePartition {
        let cores = self.cores.max(1);
        let share = self
            .coordinator_share
            .unwrap_or(self.generators / cores);
        CorePartition::new(self.generators, cores, share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(BootConfig::from_toml("").unwrap(), BootConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let boot = BootConfig::from_toml(
            r#"
            cores = 4
            sample_format = "s24"
            output_mode = "direct"
            active = 6
            "#,
        )
        .unwrap();
        assert_eq!(boot.cores, 4);
        assert_eq!(boot.format(), SampleFormat::S24);
        assert_eq!(boot.output_mode, OutputMode::Direct);
        assert_eq!(boot.output_channels(), 6);
        assert_eq!(boot.sample_rate, 48000);
    }

    #[test]
    fn unknown_format_is_a_parse_error() {
        let err = BootConfig::from_toml("sample_format = \"f32\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn even_partition_by_default() {
        let boot = BootConfig {
            generators: 16,
            cores: 4,
            ..BootConfig::default()
        };
        let partition = boot.partition();
        assert_eq!(partition.ranges(), &[0..4, 4..8, 8..12, 12..16]);
    }

    #[test]
    fn explicit_share_and_remainder() {
        let boot = BootConfig {
            generators: 10,
            cores: 3,
            coordinator_share: Some(2),
            ..BootConfig::default()
        };
        assert_eq!(boot.partition().ranges(), &[0..2, 2..6, 6..10]);

        let boot = BootConfig {
            generators: 10,
            cores: 3,
            ..BootConfig::default()
        };
        assert_eq!(boot.partition().ranges(), &[0..4, 4..7, 7..10]);
    }

    #[test]
    fn cycle_bytes() {
        let boot = BootConfig {
            frames_per_cycle: 64,
            sample_format: SampleFormatConfig::S24,
            ..BootConfig::default()
        };
        assert_eq!(boot.cycle_bytes(), 64 * 2 * 4);
    }
}
