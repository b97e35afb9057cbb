//! Effect chain: three selectable slots, then compressor, then EQ.
//!
//! ```text
//! in ─▶ slot 0 ─▶ slot 1 ─▶ slot 2 ─▶ Compressor ─▶ EQ ─▶ out
//! ```
//!
//! The chain is shared between the render path and the control path
//! (typically as `Arc<EffectChain>`), and every method takes `&self`. One
//! `spin::Mutex` serializes all access to the processing state:
//!
//! - the render path takes it only for the duration of one
//!   [`EffectChain::process`] call,
//! - control-path mutation (slot selection, parameter changes, reset) takes
//!   it only long enough to swap or poke a value. New units are built, and
//!   replaced units dropped, outside the lock.
//!
//! The bypass flag is an atomic so the render path can test it without the
//! lock, but it is only written under the lock, so a toggle never lands in
//! the middle of a `process` call. The process-call counter never needs the
//! lock.

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tinyrack_core::Effect;

use crate::compressor::{Compressor, CompressorSettings};
use crate::eq::{EqGains, ThreeBandEq};
use crate::unit::{EffectType, FxUnit};

/// Number of selectable effect slots per chain.
pub const CHAIN_SLOTS: usize = 3;

#[derive(Debug)]
struct ChainState {
    slots: [FxUnit; CHAIN_SLOTS],
    compressor: Compressor,
    eq: ThreeBandEq,
    sample_rate: f32,
}

/// Serialized effect chain.
///
/// # Example
///
/// ```rust
/// use tinyrack_effects::{EffectChain, EffectType};
///
/// let chain = EffectChain::new(48000.0);
/// chain.set_slot(0, EffectType::Reverb);
/// chain.set_slot_param(0, 2, 0.5);
///
/// let (mut left, mut right) = ([0.0; 128], [0.0; 128]);
/// chain.process(&mut left, &mut right);
/// assert_eq!(chain.process_calls(), 1);
/// ```
#[derive(Debug)]
pub struct EffectChain {
    state: spin::Mutex<ChainState>,
    bypass: AtomicBool,
    process_calls: AtomicUsize,
}

impl EffectChain {
    /// Creates an empty, non-bypassed chain with both fixed stages disabled.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            state: spin::Mutex::new(ChainState {
                slots: Default::default(),
                compressor: Compressor::new(sample_rate),
                eq: ThreeBandEq::new(sample_rate),
                sample_rate,
            }),
            bypass: AtomicBool::new(false),
            process_calls: AtomicUsize::new(0),
        }
    }

    /// Runs the chain in place over one cycle.
    ///
    /// Always processes; callers skip bypassed chains before calling.
    pub fn process(&self, left: &mut [f32], right: &mut [f32]) {
        self.process_calls.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock();
        for unit in &mut state.slots {
            unit.process_stereo(left, right);
        }
        state.compressor.process_stereo(left, right);
        state.eq.process_stereo(left, right);
    }

    /// Number of [`process`](Self::process) calls so far.
    pub fn process_calls(&self) -> usize {
        self.process_calls.load(Ordering::Relaxed)
    }

    /// True when the render path should skip this chain.
    pub fn is_bypassed(&self) -> bool {
        self.bypass.load(Ordering::Acquire)
    }

    /// Sets the bypass flag, waiting out any `process` call in progress.
    pub fn set_bypass(&self, bypass: bool) {
        let _state = self.state.lock();
        self.bypass.store(bypass, Ordering::Release);
    }

    /// Selects the effect in `slot`. Returns false for an unknown slot.
    ///
    /// Selecting the type already present keeps its state.
    pub fn set_slot(&self, slot: usize, kind: EffectType) -> bool {
        if slot >= CHAIN_SLOTS {
            return false;
        }
        let sample_rate = {
            let state = self.state.lock();
            if state.slots[slot].kind() == kind {
                return true;
            }
            state.sample_rate
        };

        let unit = FxUnit::new(kind, sample_rate);
        let replaced = {
            let mut state = self.state.lock();
            core::mem::replace(&mut state.slots[slot], unit)
        };
        drop(replaced);
        true
    }

    /// Effect selected in `slot`.
    pub fn slot_type(&self, slot: usize) -> Option<EffectType> {
        self.state.lock().slots.get(slot).map(FxUnit::kind)
    }

    /// Sets a normalized parameter of the effect in `slot`.
    pub fn set_slot_param(&self, slot: usize, index: usize, value: f32) -> bool {
        let mut state = self.state.lock();
        match state.slots.get_mut(slot) {
            Some(unit) => {
                unit.set_param(index, value);
                true
            }
            None => false,
        }
    }

    /// Enables or disables the compressor stage and applies `settings`.
    pub fn set_compressor(&self, enabled: bool, settings: CompressorSettings) {
        let mut state = self.state.lock();
        state.compressor.set_enabled(enabled);
        state.compressor.set_settings(settings);
    }

    /// Compressor enable flag and current settings.
    pub fn compressor(&self) -> (bool, CompressorSettings) {
        let state = self.state.lock();
        (state.compressor.is_enabled(), state.compressor.settings())
    }

    /// Enables or disables the EQ stage and applies `gains`.
    pub fn set_eq(&self, enabled: bool, gains: EqGains) {
        let mut state = self.state.lock();
        state.eq.set_enabled(enabled);
        state.eq.set_gains(gains);
    }

    /// EQ enable flag and current gains.
    pub fn eq(&self) -> (bool, EqGains) {
        let state = self.state.lock();
        (state.eq.is_enabled(), state.eq.gains())
    }

    /// Clears every stage's internal state. Only call while the output is
    /// muted.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        for unit in &mut state.slots {
            unit.reset();
        }
        state.compressor.reset();
        state.eq.reset();
    }

    /// Empties every slot and disables the fixed stages.
    pub fn clear(&self) {
        let replaced = {
            let mut state = self.state.lock();
            state.compressor.set_enabled(false);
            state.eq.set_enabled(false);
            core::mem::take(&mut state.slots)
        };
        drop(replaced);
        self.set_bypass(false);
    }

    /// Retunes every stage for a new sample rate.
    pub fn set_sample_rate(&self, sample_rate: f32) {
        let mut state = self.state.lock();
        state.sample_rate = sample_rate;
        for unit in &mut state.slots {
            unit.set_sample_rate(sample_rate);
        }
        state.compressor.set_sample_rate(sample_rate);
        state.eq.set_sample_rate(sample_rate);
    }
}
