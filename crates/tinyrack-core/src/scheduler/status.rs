//! Per-core status word backing the cross-core barrier.

use core::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one worker core.
///
/// `Init -> Idle` once at boot, `Idle <-> Busy` once per cycle, `Exit` only at
/// shutdown. `Unknown` is what an unrecognized byte decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CoreStatus {
    /// Spawned, not yet waiting for work.
    Init = 0,
    /// Waiting for the next cycle.
    Idle = 1,
    /// Rendering its lane for the current cycle.
    Busy = 2,
    /// Told to shut down.
    Exit = 3,
    /// Undecodable status byte.
    Unknown = 4,
}

impl CoreStatus {
    /// Decodes a raw status byte.
    #[inline]
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Init,
            1 => Self::Idle,
            2 => Self::Busy,
            3 => Self::Exit,
            _ => Self::Unknown,
        }
    }
}

/// Atomic cell holding a [`CoreStatus`].
///
/// Written only by the owning worker or the coordinator. Stores publish with
/// `Release` and loads observe with `Acquire`, so lane data written before a
/// transition is visible to whoever sees the new status.
#[derive(Debug)]
pub struct CoreState(AtomicU8);

impl CoreState {
    /// A cell in the `Init` state.
    pub const fn new() -> Self {
        Self(AtomicU8::new(CoreStatus::Init as u8))
    }

    /// Current status, with `Acquire` ordering.
    #[inline]
    pub fn load(&self) -> CoreStatus {
        CoreStatus::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Publishes `status` with `Release` ordering.
    #[inline]
    pub fn store(&self, status: CoreStatus) {
        self.0.store(status as u8, Ordering::Release);
    }

    /// Moves `from -> to` only if the current status is `from`.
    pub fn transition(&self, from: CoreStatus, to: CoreStatus) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for CoreState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_init() {
        assert_eq!(CoreState::new().load(), CoreStatus::Init);
    }

    #[test]
    fn decodes_unknown_bytes() {
        assert_eq!(CoreStatus::from_u8(2), CoreStatus::Busy);
        assert_eq!(CoreStatus::from_u8(200), CoreStatus::Unknown);
    }

    #[test]
    fn transition_requires_expected_state() {
        let state = CoreState::new();
        assert!(!state.transition(CoreStatus::Idle, CoreStatus::Busy));
        assert!(state.transition(CoreStatus::Init, CoreStatus::Idle));
        assert!(state.transition(CoreStatus::Idle, CoreStatus::Busy));
        assert_eq!(state.load(), CoreStatus::Busy);
    }
}
