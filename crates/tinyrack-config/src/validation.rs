//! Boot configuration and performance validation.
//!
//! Every check runs and the failures are collected, so a bad file reports
//! all of its problems at once. A single failure comes back as itself; more
//! than one as [`ValidationError::Multiple`].
//!
//! # Example
//!
//! ```rust
//! use tinyrack_config::{BootConfig, validate_boot};
//!
//! let mut boot = BootConfig::default();
//! assert!(validate_boot(&boot).is_ok());
//!
//! boot.active = boot.generators + 1;
//! assert!(validate_boot(&boot).is_err());
//! ```

use thiserror::Error;
use tinyrack_core::{MAX_SEND_BUSES, MAX_TONE_GENERATORS};
use tinyrack_effects::{CHAIN_SLOTS, EffectType};

use crate::boot::{BootConfig, OutputMode};
use crate::chain::ChainConfig;
use crate::performance::Performance;

/// Lowest supported sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 8000;
/// Highest supported sample rate in Hz.
pub const MAX_SAMPLE_RATE: u32 = 192_000;
/// Largest render cycle in frames.
pub const MAX_FRAMES_PER_CYCLE: usize = 4096;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Value out of range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the offending field.
        param: String,
        /// The value that was out of range.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// A list holds more entries than the engine supports.
    #[error("'{param}' has {count} entries, at most {max} allowed")]
    TooMany {
        /// Dotted path of the list.
        param: String,
        /// Entries present.
        count: usize,
        /// Entries allowed.
        max: usize,
    },

    /// Unknown effect type.
    #[error("unknown effect type '{name}' at '{param}'")]
    UnknownEffect {
        /// Dotted path of the slot.
        param: String,
        /// Name as written.
        name: String,
    },

    /// Fields that are individually valid but do not fit together.
    #[error("'{param}': {reason}")]
    Inconsistent {
        /// Dotted path of the field.
        param: String,
        /// Description of the conflict.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Default)]
struct Collector {
    errors: Vec<ValidationError>,
}

impl Collector {
    fn range(&mut self, param: impl Into<String>, value: f64, min: f64, max: f64) {
        // NaN fails both comparisons and is reported too.
        if !(value >= min && value <= max) {
            self.errors.push(ValidationError::OutOfRange {
                param: param.into(),
                value,
                min,
                max,
            });
        }
    }

    fn unit(&mut self, param: impl Into<String>, value: f32) {
        self.range(param, f64::from(value), 0.0, 1.0);
    }

    fn count(&mut self, param: impl Into<String>, count: usize, max: usize) {
        if count > max {
            self.errors.push(ValidationError::TooMany {
                param: param.into(),
                count,
                max,
            });
        }
    }

    fn inconsistent(&mut self, param: impl Into<String>, reason: impl Into<String>) {
        self.errors.push(ValidationError::Inconsistent {
            param: param.into(),
            reason: reason.into(),
        });
    }

    fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}

/// Validates a boot configuration.
pub fn validate_boot(boot: &BootConfig) -> ValidationResult<()> {
    let mut c = Collector::default();

    c.range(
        "sample_rate",
        f64::from(boot.sample_rate),
        f64::from(MIN_SAMPLE_RATE),
        f64::from(MAX_SAMPLE_RATE),
    );
    c.range(
        "generators",
        boot.generators as f64,
        1.0,
        MAX_TONE_GENERATORS as f64,
    );
    c.range(
        "frames_per_cycle",
        boot.frames_per_cycle as f64,
        1.0,
        MAX_FRAMES_PER_CYCLE as f64,
    );
    c.range("send_buses", boot.send_buses as f64, 0.0, MAX_SEND_BUSES as f64);
    c.range("cores", boot.cores as f64, 1.0, boot.generators.max(1) as f64);
    c.unit("master_volume", boot.master_volume);

    if boot.active > boot.generators {
        c.inconsistent(
            "active",
            format!(
                "{} active tone generators but only {} allocated",
                boot.active, boot.generators
            ),
        );
    }
    if let Some(share) = boot.coordinator_share {
        if share > boot.generators {
            c.inconsistent(
                "coordinator_share",
                format!("{share} exceeds the {} tone generators", boot.generators),
            );
        }
    }
    if boot.queue_frames < boot.frames_per_cycle * 2 {
        c.inconsistent(
            "queue_frames",
            format!(
                "queue of {} frames cannot hold two cycles of {}",
                boot.queue_frames, boot.frames_per_cycle
            ),
        );
    }
    if boot.output_mode == OutputMode::Direct && boot.active == 0 {
        c.inconsistent("output_mode", "direct output needs at least one active generator");
    }

    c.finish()
}

/// Validates a performance against the engine's fixed limits.
pub fn validate_performance(performance: &Performance) -> ValidationResult<()> {
    let mut c = Collector::default();

    c.count("slots", performance.slots.len(), MAX_TONE_GENERATORS);
    for (i, slot) in performance.slots.iter().enumerate() {
        c.unit(format!("slots[{i}].volume"), slot.volume);
        c.unit(format!("slots[{i}].pan"), slot.pan);
        c.count(format!("slots[{i}].sends"), slot.sends.len(), MAX_SEND_BUSES);
        for (bus, level) in slot.sends.iter().enumerate() {
            c.unit(format!("slots[{i}].sends[{bus}]"), *level);
        }
        if let Some(channel) = slot.midi_channel {
            c.range(
                format!("slots[{i}].midi_channel"),
                f64::from(channel),
                0.0,
                15.0,
            );
        }
    }

    c.count("send_buses", performance.send_buses.len(), MAX_SEND_BUSES);
    for (i, bus) in performance.send_buses.iter().enumerate() {
        c.unit(format!("send_buses[{i}].return_level"), bus.return_level);
        check_chain(&mut c, &format!("send_buses[{i}].chain"), &bus.chain);
    }
    check_chain(&mut c, "master", &performance.master);

    c.finish()
}

/// Validates one chain configuration.
pub fn validate_chain(chain: &ChainConfig) -> ValidationResult<()> {
    let mut c = Collector::default();
    check_chain(&mut c, "chain", chain);
    c.finish()
}

fn check_chain(c: &mut Collector, prefix: &str, chain: &ChainConfig) {
    c.count(format!("{prefix}.effects"), chain.effects.len(), CHAIN_SLOTS);
    for (i, slot) in chain.effects.iter().enumerate() {
        let path = format!("{prefix}.effects[{i}]");
        let Some(kind) = EffectType::from_name(&slot.effect_type) else {
            c.errors.push(ValidationError::UnknownEffect {
                param: path,
                name: slot.effect_type.clone(),
            });
            continue;
        };
        c.count(format!("{path}.params"), slot.params.len(), kind.param_count());
        for (p, value) in slot.params.iter().enumerate() {
            c.unit(format!("{path}.params[{p}]"), *value);
        }
    }

    let comp = &chain.compressor;
    c.range(
        format!("{prefix}.compressor.threshold_db"),
        f64::from(comp.threshold_db),
        -60.0,
        0.0,
    );
    c.range(format!("{prefix}.compressor.ratio"), f64::from(comp.ratio), 1.0, 20.0);
    c.range(
        format!("{prefix}.compressor.attack_ms"),
        f64::from(comp.attack_ms),
        0.1,
        200.0,
    );
    c.range(
        format!("{prefix}.compressor.release_ms"),
        f64::from(comp.release_ms),
        5.0,
        2000.0,
    );
    c.range(
        format!("{prefix}.compressor.makeup_db"),
        f64::from(comp.makeup_db),
        0.0,
        24.0,
    );

    for (band, gain) in [
        ("low_db", chain.eq.low_db),
        ("mid_db", chain.eq.mid_db),
        ("high_db", chain.eq.high_db),
    ] {
        c.range(format!("{prefix}.eq.{band}"), f64::from(gain), -12.0, 12.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::EffectSlotConfig;
    use crate::performance::{SendBusConfig, SlotConfig};

    #[test]
    fn default_boot_is_valid() {
        assert_eq!(validate_boot(&BootConfig::default()), Ok(()));
    }

    #[test]
    fn single_failure_is_not_wrapped() {
        let boot = BootConfig {
            sample_rate: 1000,
            ..BootConfig::default()
        };
        assert!(matches!(
            validate_boot(&boot),
            Err(ValidationError::OutOfRange { ref param, .. }) if param == "sample_rate"
        ));
    }

    #[test]
    fn every_failure_is_reported() {
        let boot = BootConfig {
            generators: 4,
            active: 5,
            cores: 8,
            queue_frames: 16,
            ..BootConfig::default()
        };
        match validate_boot(&boot) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn direct_mode_needs_active_generators() {
        let boot = BootConfig {
            active: 0,
            output_mode: OutputMode::Direct,
            ..BootConfig::default()
        };
        assert!(validate_boot(&boot).is_err());
    }

    #[test]
    fn nan_volume_is_rejected() {
        let boot = BootConfig {
            master_volume: f32::NAN,
            ..BootConfig::default()
        };
        assert!(validate_boot(&boot).is_err());
    }

    #[test]
    fn performance_limits() {
        let mut performance = Performance::new("limits");
        performance.slots.push(SlotConfig {
            volume: 1.5,
            sends: vec![0.0; MAX_SEND_BUSES + 1],
            ..SlotConfig::default()
        });
        performance.send_buses.push(SendBusConfig {
            return_level: 0.5,
            chain: ChainConfig {
                effects: vec![EffectSlotConfig::new("flanger")],
                ..ChainConfig::default()
            },
        });
        match validate_performance(&performance) {
            Err(ValidationError::Multiple(errors)) => {
                assert_eq!(errors.len(), 3);
                assert!(errors.iter().any(|e| matches!(
                    e,
                    ValidationError::UnknownEffect { name, .. } if name == "flanger"
                )));
            }
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn too_many_params_for_effect() {
        let chain = ChainConfig {
            effects: vec![EffectSlotConfig::new("delay").with_params([0.1, 0.2, 0.3, 0.4])],
            ..ChainConfig::default()
        };
        assert!(matches!(
            validate_chain(&chain),
            Err(ValidationError::TooMany { count: 4, max: 3, .. })
        ));
    }
}
