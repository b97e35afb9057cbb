//! tinyrack Effects - built-in effect variants and the effect chain
//!
//! The render core treats effects as opaque in-place stereo processors. This
//! crate ships the small fixed set a chain slot can select, plus the fixed
//! stages every chain carries:
//!
//! - [`Chorus`] - Dual-voice chorus with quadrature LFOs
//! - [`Delay`] - Damped feedback delay
//! - [`Overdrive`] - Soft-clipping drive with tone control
//! - [`Reverb`] - Small Schroeder reverb
//! - [`Phaser`] - Four-stage allpass phaser
//! - [`Compressor`] - Fixed stereo-linked compressor stage
//! - [`ThreeBandEq`] - Fixed three-band EQ stage
//!
//! [`EffectChain`] wires three [`FxUnit`] slots into the compressor and EQ
//! behind a single mutation lock, so the control path can reconfigure a
//! chain that the render path is using.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tinyrack_effects::{EffectChain, EffectType};
//!
//! let chain = Arc::new(EffectChain::new(48000.0));
//!
//! // Control path
//! let control = Arc::clone(&chain);
//! control.set_slot(0, EffectType::Chorus);
//! control.set_slot(1, EffectType::Reverb);
//!
//! // Render path
//! let (mut left, mut right) = ([0.0f32; 128], [0.0f32; 128]);
//! if !chain.is_bypassed() {
//!     chain.process(&mut left, &mut right);
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod chain;
pub mod chorus;
pub mod compressor;
pub mod delay;
pub mod eq;
pub mod overdrive;
pub mod phaser;
pub mod reverb;
pub mod unit;

// Re-export main types at crate root
pub use chain::{CHAIN_SLOTS, EffectChain};
pub use chorus::Chorus;
pub use compressor::{Compressor, CompressorSettings};
pub use delay::Delay;
pub use eq::{EqGains, ThreeBandEq};
pub use overdrive::Overdrive;
pub use phaser::Phaser;
pub use reverb::Reverb;
pub use unit::{EffectType, FxUnit};
