//! Render engine and output delivery for tinyrack.
//!
//! This crate wires the core building blocks into one running engine:
//!
//! - **Render engine**: [`RenderEngine`] schedules the tone generators, routes
//!   them through the main and send buses and the effect chains, applies the
//!   master volume ramp, and formats the result for the device
//! - **Routing**: [`SendEffectBus`], a send mix plus its effect chain
//! - **Output devices**: the [`OutputDevice`] trait, an in-memory
//!   [`QueueDevice`], and a [`WavDevice`] that records to disk
//!
//! ## Quick Start
//!
//! ```rust
//! use tinyrack_config::BootConfig;
//! use tinyrack_core::ToneGenerator;
//! use tinyrack_io::{CycleOutcome, QueueDevice, RenderEngine};
//!
//! struct Dc;
//! impl ToneGenerator for Dc {
//!     fn render(&mut self, out: &mut [f32]) { out.fill(0.1); }
//!     fn reset(&mut self) {}
//! }
//!
//! let boot = BootConfig { generators: 2, active: 2, ..BootConfig::default() };
//! let mut engine = RenderEngine::new(&boot, vec![Dc, Dc]).unwrap();
//! let mut device = QueueDevice::new(boot.queue_frames, 2, boot.format());
//!
//! assert_eq!(engine.process(&mut device), CycleOutcome::Rendered);
//! assert_eq!(device.queued_frames(), boot.frames_per_cycle);
//! ```

mod engine;
mod output;
mod routing;
mod wav;

pub use engine::{CycleOutcome, EngineStats, RenderEngine};
pub use output::{OutputDevice, QueueDevice};
pub use routing::SendEffectBus;
pub use wav::{WavDevice, read_wav_samples};

/// Error types for engine setup and output delivery.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] tinyrack_config::ConfigError),

    /// The pieces handed to the engine do not match the boot configuration.
    #[error("engine setup error: {0}")]
    Setup(String),

    /// Standard I/O error, including worker thread spawn failures.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tinyrack_config::ValidationError> for Error {
    fn from(err: tinyrack_config::ValidationError) -> Self {
        Error::Config(err.into())
    }
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
