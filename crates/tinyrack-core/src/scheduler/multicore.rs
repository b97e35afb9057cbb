//! Multi-core scheduler with a spin barrier.
//!
//! Core 0 is the coordinator: the thread that calls
//! [`Scheduler::render_cycle`]. Cores `1..cores` are worker threads spawned at
//! boot, each owning one lane of contiguous slots.
//!
//! Per cycle:
//!
//! ```text
//! coordinator                         worker k
//! ───────────                         ────────
//! frames[k] = n
//! status[k] = Busy ── unpark ──▶      sees Busy
//! render lane 0                       lock lane, render, unlock
//! spin until status[k] == Idle  ◀──── status[k] = Idle
//! ```
//!
//! Each lane sits behind a `spin::Mutex` that the status protocol keeps
//! uncontended: the worker holds it only while Busy, the coordinator only
//! while the worker is Idle. There is no timeout. A worker that never returns
//! to Idle stalls the cycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle, Thread};

use super::{CorePartition, CoreState, CoreStatus, Scheduler};
use crate::tone_generator::{ToneGenerator, ToneGeneratorSlot};

struct LaneShared<G> {
    status: CoreState,
    frames: AtomicUsize,
    slots: spin::Mutex<Vec<ToneGeneratorSlot<G>>>,
}

struct Worker<G> {
    shared: Arc<LaneShared<G>>,
    thread: Thread,
    handle: Option<JoinHandle<()>>,
}

/// Renders lanes of slots on `cores - 1` worker threads plus the caller.
pub struct MultiCoreScheduler<G> {
    /// Lane 0, rendered by the coordinator.
    local: Vec<ToneGeneratorSlot<G>>,
    workers: Vec<Worker<G>>,
    partition: CorePartition,
    slot_count: usize,
}

impl<G: ToneGenerator + 'static> MultiCoreScheduler<G> {
    /// Splits `slots` by `partition` and spawns one thread per worker lane.
    ///
    /// Returns once every worker has moved from Init to Idle.
    ///
    /// # Errors
    ///
    /// Returns the OS error if a worker thread cannot be spawned. Workers
    /// already started are shut down before returning.
    ///
    /// # Panics
    ///
    /// Panics if `partition` does not tile exactly `slots.len()` generators.
    pub fn new(
        slots: Vec<ToneGeneratorSlot<G>>,
        partition: CorePartition,
    ) -> std::io::Result<Self> {
        assert!(
            partition.is_valid() && partition.generators() == slots.len(),
            "partition does not cover the slot set"
        );

        let slot_count = slots.len();
        let mut remaining = slots.into_iter();
        let local: Vec<_> = remaining.by_ref().take(partition.range(0).len()).collect();

        let mut scheduler = Self {
            local,
            workers: Vec::with_capacity(partition.cores().saturating_sub(1)),
            partition: partition.clone(),
            slot_count,
        };

        for core in 1..partition.cores() {
            let lane: Vec<_> = remaining
                .by_ref()
                .take(partition.range(core).len())
                .collect();
            let shared = Arc::new(LaneShared {
                status: CoreState::new(),
                frames: AtomicUsize::new(0),
                slots: spin::Mutex::new(lane),
            });

            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("tinyrack-core{core}"))
                .spawn(move || worker_loop(core, &worker_shared))?;

            scheduler.workers.push(Worker {
                shared,
                thread: handle.thread().clone(),
                handle: Some(handle),
            });
        }

        for worker in &scheduler.workers {
            while worker.shared.status.load() == CoreStatus::Init {
                core::hint::spin_loop();
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            cores = scheduler.partition.cores(),
            generators = slot_count,
            ranges = ?scheduler.partition.ranges(),
            "scheduler: workers ready"
        );

        Ok(scheduler)
    }

    fn lane_of(&self, index: usize) -> Option<(usize, usize)> {
        let core = self.partition.core_of(index)?;
        Some((core, index - self.partition.range(core).start))
    }
}

fn worker_loop<G: ToneGenerator>(core: usize, shared: &LaneShared<G>) {
    // Exit may already be set if the scheduler was dropped mid-construction.
    if !shared.status.transition(CoreStatus::Init, CoreStatus::Idle) {
        return;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(core, "scheduler: worker idle");
    #[cfg(not(feature = "tracing"))]
    let _ = core;

    loop {
        match shared.status.load() {
            CoreStatus::Busy => {
                let frames = shared.frames.load(Ordering::Acquire);
                {
                    let mut lane = shared.slots.lock();
                    for slot in lane.iter_mut() {
                        slot.render(frames);
                    }
                }
                shared.status.store(CoreStatus::Idle);
            }
            CoreStatus::Exit => break,
            _ => thread::park(),
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(core, "scheduler: worker exit");
}

impl<G: ToneGenerator + 'static> Scheduler<G> for MultiCoreScheduler<G> {
    fn render_cycle(&mut self, frames: usize) {
        for worker in &self.workers {
            worker.shared.frames.store(frames, Ordering::Release);
            worker.shared.status.store(CoreStatus::Busy);
            worker.thread.unpark();
        }

        for slot in &mut self.local {
            slot.render(frames);
        }

        for worker in &self.workers {
            while worker.shared.status.load() != CoreStatus::Idle {
                core::hint::spin_loop();
            }
        }
    }

    fn for_each_output(&mut self, f: &mut dyn FnMut(&ToneGeneratorSlot<G>)) {
        for slot in &self.local {
            f(slot);
        }
        for worker in &self.workers {
            let lane = worker.shared.slots.lock();
            for slot in lane.iter() {
                f(slot);
            }
        }
    }

    fn with_slot(&mut self, index: usize, f: &mut dyn FnMut(&ToneGeneratorSlot<G>)) -> bool {
        self.with_slot_mut(index, &mut |slot| f(&*slot))
    }

    fn with_slot_mut(
        &mut self,
        index: usize,
        f: &mut dyn FnMut(&mut ToneGeneratorSlot<G>),
    ) -> bool {
        let Some((core, offset)) = self.lane_of(index) else {
            return false;
        };
        if core == 0 {
            return match self.local.get_mut(offset) {
                Some(slot) => {
                    f(slot);
                    true
                }
                None => false,
            };
        }
        let Some(worker) = self.workers.get(core - 1) else {
            return false;
        };
        let mut lane = worker.shared.slots.lock();
        match lane.get_mut(offset) {
            Some(slot) => {
                f(slot);
                true
            }
            None => false,
        }
    }

    fn slot_count(&self) -> usize {
        self.slot_count
    }

    fn reset_generators(&mut self) {
        for slot in &mut self.local {
            slot.reset();
        }
        for worker in &self.workers {
            for slot in worker.shared.slots.lock().iter_mut() {
                slot.reset();
            }
        }
    }

    fn partition(&self) -> &CorePartition {
        &self.partition
    }
}

impl<G> Drop for MultiCoreScheduler<G> {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.shared.status.store(CoreStatus::Exit);
            worker.thread.unpark();
        }
        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                let _ = handle.join();
            }
        }
    }
}
