//! Tone generator scheduling across cores.
//!
//! A scheduler owns every [`ToneGeneratorSlot`] and renders all of them once
//! per cycle. When [`Scheduler::render_cycle`] returns, every slot's cycle
//! buffer is complete and safe to read.
//!
//! - [`SingleCoreScheduler`] renders sequentially on the calling thread.
//! - [`MultiCoreScheduler`] (`std` only) spreads the slots over worker
//!   threads according to a [`CorePartition`] and meets them at a spin
//!   barrier.
//!
//! Generator render order never affects the result since the router only
//! sums slot outputs.

mod partition;
mod single;
mod status;

#[cfg(feature = "std")]
mod multicore;

pub use partition::CorePartition;
pub use single::SingleCoreScheduler;
pub use status::{CoreState, CoreStatus};

#[cfg(feature = "std")]
pub use multicore::MultiCoreScheduler;

use crate::tone_generator::{ToneGenerator, ToneGeneratorSlot};

/// Common interface over the single- and multi-core schedulers.
///
/// Slot accessors take `&mut dyn FnMut` so the trait stays object safe and
/// the engine can pick a scheduler at boot.
pub trait Scheduler<G: ToneGenerator> {
    /// Renders every slot for one cycle of `frames` frames.
    fn render_cycle(&mut self, frames: usize);

    /// Visits every slot in index order after a cycle.
    fn for_each_output(&mut self, f: &mut dyn FnMut(&ToneGeneratorSlot<G>));

    /// Runs `f` on slot `index`. Returns false for unknown indices.
    fn with_slot(&mut self, index: usize, f: &mut dyn FnMut(&ToneGeneratorSlot<G>)) -> bool;

    /// Runs `f` on slot `index` mutably. Returns false for unknown indices.
    ///
    /// Must not be called while a cycle is in flight; the schedulers only
    /// expose it between cycles.
    fn with_slot_mut(&mut self, index: usize, f: &mut dyn FnMut(&mut ToneGeneratorSlot<G>))
    -> bool;

    /// Total slots across all cores.
    fn slot_count(&self) -> usize;

    /// Resets every generator. Only valid while the output is muted.
    fn reset_generators(&mut self);

    /// Core assignment the scheduler was built with.
    fn partition(&self) -> &CorePartition;
}
