//! Sequential scheduler for single-core targets.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::{CorePartition, Scheduler};
use crate::tone_generator::{ToneGenerator, ToneGeneratorSlot};

/// Renders all slots in order on the calling thread. No barrier.
#[derive(Debug)]
pub struct SingleCoreScheduler<G> {
    slots: Vec<ToneGeneratorSlot<G>>,
    partition: CorePartition,
}

impl<G: ToneGenerator> SingleCoreScheduler<G> {
    /// Takes ownership of `slots`, all on core 0.
    pub fn new(slots: Vec<ToneGeneratorSlot<G>>) -> Self {
        let partition = CorePartition::single(slots.len());
        Self { slots, partition }
    }

    /// All slots, in index order.
    pub fn slots(&self) -> &[ToneGeneratorSlot<G>] {
        &self.slots
    }
}

impl<G: ToneGenerator> Scheduler<G> for SingleCoreScheduler<G> {
    fn render_cycle(&mut self, frames: usize) {
        for slot in &mut self.slots {
            slot.render(frames);
        }
    }

    fn for_each_output(&mut self, f: &mut dyn FnMut(&ToneGeneratorSlot<G>)) {
        for slot in &self.slots {
            f(slot);
        }
    }

    fn with_slot(&mut self, index: usize, f: &mut dyn FnMut(&ToneGeneratorSlot<G>)) -> bool {
        match self.slots.get(index) {
            Some(slot) => {
                f(slot);
                true
            }
            None => false,
        }
    }

    fn with_slot_mut(
        &mut self,
        index: usize,
        f: &mut dyn FnMut(&mut ToneGeneratorSlot<G>),
    ) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                f(slot);
                true
            }
            None => false,
        }
    }

    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn reset_generators(&mut self) {
        for slot in &mut self.slots {
            slot.reset();
        }
    }

    fn partition(&self) -> &CorePartition {
        &self.partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Index(f32);

    impl ToneGenerator for Index {
        fn render(&mut self, out: &mut [f32]) {
            out.fill(self.0);
        }
        fn reset(&mut self) {
            self.0 = 0.0;
        }
    }

    fn scheduler(n: usize) -> SingleCoreScheduler<Index> {
        let slots = (0..n)
            .map(|i| {
                let mut slot = ToneGeneratorSlot::new(i, Index(i as f32), 4);
                slot.set_enabled(true);
                slot
            })
            .collect();
        SingleCoreScheduler::new(slots)
    }

    #[test]
    fn renders_every_slot() {
        let mut s = scheduler(3);
        s.render_cycle(4);
        let mut seen = Vec::new();
        s.for_each_output(&mut |slot| seen.push(slot.output(4)[0]));
        assert_eq!(seen, [0.0, 1.0, 2.0]);
    }

    #[test]
    fn slot_access_by_index() {
        let mut s = scheduler(2);
        assert!(s.with_slot_mut(1, &mut |slot| slot.set_volume(0.25)));
        assert!(!s.with_slot_mut(2, &mut |_| {}));
        let mut volume = 0.0;
        s.with_slot(1, &mut |slot| volume = slot.volume());
        assert_eq!(volume, 0.25);
    }

    #[test]
    fn reset_reaches_generators() {
        let mut s = scheduler(2);
        s.reset_generators();
        s.render_cycle(4);
        assert_eq!(s.slots()[1].output(4), &[0.0; 4]);
        assert_eq!(s.partition().ranges(), &[0..2]);
    }
}
