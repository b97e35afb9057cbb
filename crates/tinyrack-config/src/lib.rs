//! Boot configuration and performance parameters for tinyrack.
//!
//! Two documents drive the render engine:
//!
//! - **[`BootConfig`]**: the fixed shape of the engine (sample rate,
//!   generator and bus counts, core partition, output format, queue size).
//!   Read once at startup.
//! - **[`Performance`]**: the switchable parameter set (per-slot volume,
//!   pan, sends, MIDI channel; per-bus return level and effect chain; the
//!   master chain). Applied at mute boundaries.
//!
//! Both are TOML files, loaded with serde and checked by [`validation`].
//!
//! # Example
//!
//! ```rust
//! use tinyrack_config::{BootConfig, ChainConfig, EffectSlotConfig, Performance, SendBusConfig};
//!
//! let boot = BootConfig::from_toml("cores = 2\nactive = 4").unwrap();
//! boot.validate().unwrap();
//!
//! let performance = Performance::new("Hall").with_send_bus(SendBusConfig {
//!     return_level: 0.5,
//!     chain: ChainConfig::default()
//!         .with_effect(EffectSlotConfig::new("reverb").with_params([0.8])),
//! });
//! performance.validate().unwrap();
//!
//! let text = performance.to_toml().unwrap();
//! assert_eq!(Performance::from_toml(&text).unwrap(), performance);
//! ```

mod boot;
mod chain;
mod error;
mod performance;

/// Boot configuration and performance validation.
pub mod validation;

pub use boot::{BootConfig, OutputMode, SampleFormatConfig};
pub use chain::{ChainConfig, CompressorConfig, EffectSlotConfig, EqConfig};
pub use error::ConfigError;
pub use performance::{Performance, SendBusConfig, SlotConfig};
pub use validation::{
    ValidationError, ValidationResult, validate_boot, validate_chain, validate_performance,
};
