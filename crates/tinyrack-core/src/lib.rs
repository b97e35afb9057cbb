//! tinyrack Core - real-time render primitives for a multi-timbral synth
//!
//! This crate holds everything that runs inside the render cycle, designed for
//! bare-metal targets with zero allocation in the audio path.
//!
//! # Core Abstractions
//!
//! ## Tone Generators and Scheduling
//!
//! - [`ToneGenerator`] - Opaque synthesis engine contract
//! - [`ToneGeneratorSlot`] - Generator plus its routing state and cycle buffer
//! - [`Scheduler`] - Renders every slot once per cycle
//!   ([`SingleCoreScheduler`], and `MultiCoreScheduler` with the `std` feature)
//! - [`CorePartition`] / [`CoreStatus`] - Core assignment and barrier state
//!
//! ## Mixing and Level
//!
//! - [`MixBus`] - N mono channels summed to stereo with ramped gain/pan
//! - [`VolumeRamp`] - Master level and the mute gate for performance switching
//! - [`StepRamp`] / [`SmoothedParam`] - Fixed-step and exponential smoothers
//!
//! ## Effects
//!
//! - [`Effect`] - In-place stereo processor consumed by effect chains
//! - Building blocks for the built-in effects: [`Biquad`], [`OnePole`],
//!   [`DelayLine`], [`Lfo`]
//!
//! ## Output
//!
//! - [`OutputStage`] - Saturating fixed-point conversion, interleave, and the
//!   anti-auto-mute patch
//!
//! # no_std Support
//!
//! Disable the default `std` feature for bare-metal builds:
//!
//! ```toml
//! [dependencies]
//! tinyrack-core = { version = "0.1", default-features = false }
//! ```
//!
//! The `tracing` feature adds structured log events for state transitions.
//! Nothing is logged per sample.
//!
//! # Example
//!
//! ```rust
//! use tinyrack_core::{MixBus, Scheduler, SingleCoreScheduler, ToneGenerator, ToneGeneratorSlot};
//!
//! struct Dc(f32);
//!
//! impl ToneGenerator for Dc {
//!     fn render(&mut self, out: &mut [f32]) {
//!         out.fill(self.0);
//!     }
//!     fn reset(&mut self) {}
//! }
//!
//! let slots = (0..4)
//!     .map(|i| {
//!         let mut slot = ToneGeneratorSlot::new(i, Dc(0.25), 64);
//!         slot.set_enabled(true);
//!         slot
//!     })
//!     .collect();
//! let mut scheduler = SingleCoreScheduler::new(slots);
//! let mut bus = MixBus::new(4, 64, 48000.0);
//!
//! scheduler.render_cycle(64);
//! scheduler.for_each_output(&mut |slot| bus.add_mix(slot.index(), slot.output(64)));
//!
//! let (mut left, mut right) = ([0.0; 64], [0.0; 64]);
//! bus.get_mix(&mut left, &mut right);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod biquad;
pub mod buffer;
pub mod delay;
pub mod effect;
pub mod lfo;
pub mod math;
pub mod mix_bus;
pub mod one_pole;
pub mod output;
pub mod param;
pub mod scheduler;
pub mod tone_generator;
pub mod volume;

// Re-export main types at crate root
pub use biquad::{
    Biquad, Coefficients, high_shelf_coefficients, low_shelf_coefficients, peaking_coefficients,
};
pub use buffer::{SampleBuffer, StereoBuffer};
pub use delay::DelayLine;
pub use effect::Effect;
pub use lfo::Lfo;
pub use math::{
    constant_power_pan, db_to_linear, flush_denormal, linear_to_db, ms_to_samples, soft_clip,
};
pub use mix_bus::{MIX_RAMP_MS, MixBus};
pub use one_pole::OnePole;
pub use output::{OutputStage, SampleFormat};
pub use param::{SmoothedParam, StepRamp};
#[cfg(feature = "std")]
pub use scheduler::MultiCoreScheduler;
pub use scheduler::{CorePartition, CoreState, CoreStatus, Scheduler, SingleCoreScheduler};
pub use tone_generator::{MAX_SEND_BUSES, MAX_TONE_GENERATORS, ToneGenerator, ToneGeneratorSlot};
pub use volume::{VOLUME_RAMP_MS, VolumeRamp, VolumeRampState};
