//! Assignment of tone generators to cores.
//!
//! The coordinator (core 0) takes the first `coordinator_share` generators
//! plus whatever does not divide evenly; the rest are split evenly across
//! cores `1..cores`, each getting one contiguous index range.
//!
//! ```text
//! generators = 16, cores = 4, share = 4
//!   core 0: 0..4   core 1: 4..8   core 2: 8..12   core 3: 12..16
//!
//! generators = 10, cores = 3, share = 2
//!   core 0: 0..2   core 1: 2..6   core 2: 6..10
//!
//! generators = 9, cores = 3, share = 2
//!   core 0: 0..3   core 1: 3..6   core 2: 6..9      (remainder on core 0)
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::ops::Range;

/// Contiguous generator ranges, one per core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorePartition {
    generators: usize,
    ranges: Vec<Range<usize>>,
}

impl CorePartition {
    /// Builds the partition for `generators` over `cores` cores.
    ///
    /// `cores` is treated as at least 1 and `coordinator_share` is clamped to
    /// `generators`. With one core everything lands on the coordinator.
    pub fn new(generators: usize, cores: usize, coordinator_share: usize) -> Self {
        let cores = cores.max(1);
        if cores == 1 {
            return Self::single(generators);
        }

        let share = coordinator_share.min(generators);
        let workers = cores - 1;
        let rest = generators - share;
        let per_worker = rest / workers;
        let remainder = rest % workers;

        let mut ranges = Vec::with_capacity(cores);
        let mut next = share + remainder;
        ranges.push(0..next);
        for _ in 0..workers {
            ranges.push(next..next + per_worker);
            next += per_worker;
        }

        Self { generators, ranges }
    }

    /// Everything on the coordinator.
    pub fn single(generators: usize) -> Self {
        Self {
            generators,
            ranges: core::iter::once(0..generators).collect(),
        }
    }

    /// Number of cores, coordinator included.
    #[inline]
    pub fn cores(&self) -> usize {
        self.ranges.len()
    }

    /// Total generators across all cores.
    #[inline]
    pub fn generators(&self) -> usize {
        self.generators
    }

    /// Generator range of `core`; empty for unknown cores.
    pub fn range(&self, core: usize) -> Range<usize> {
        self.ranges.get(core).cloned().unwrap_or(0..0)
    }

    /// Every core's range, coordinator first.
    #[inline]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    /// Core that renders `generator`.
    pub fn core_of(&self, generator: usize) -> Option<usize> {
        self.ranges.iter().position(|r| r.contains(&generator))
    }

    /// True when the ranges tile `0..generators` in order with no gap and no
    /// overlap.
    pub fn is_valid(&self) -> bool {
        let mut expected = 0;
        for range in &self.ranges {
            if range.start != expected || range.end < range.start {
                return false;
            }
            expected = range.end;
        }
        expected == self.generators
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_split_after_share() {
        let p = CorePartition::new(16, 4, 4);
        assert_eq!(p.ranges(), &[0..4, 4..8, 8..12, 12..16]);
        assert!(p.is_valid());
    }

    #[test]
    fn remainder_goes_to_coordinator() {
        let p = CorePartition::new(9, 3, 2);
        assert_eq!(p.ranges(), &[0..3, 3..6, 6..9]);
        assert!(p.is_valid());
    }

    #[test]
    fn single_core_takes_everything() {
        let p = CorePartition::new(8, 1, 2);
        assert_eq!(p.ranges(), &[0..8]);
        assert_eq!(p.cores(), 1);
    }

    #[test]
    fn zero_cores_treated_as_one() {
        assert_eq!(CorePartition::new(5, 0, 0).ranges(), &[0..5]);
    }

    #[test]
    fn share_clamped_to_generator_count() {
        let p = CorePartition::new(3, 2, 10);
        assert_eq!(p.ranges(), &[0..3, 3..3]);
        assert!(p.is_valid());
    }

    #[test]
    fn more_workers_than_generators() {
        let p = CorePartition::new(2, 4, 0);
        assert_eq!(p.ranges(), &[0..2, 2..2, 2..2, 2..2]);
        assert!(p.is_valid());
    }

    #[test]
    fn core_lookup() {
        let p = CorePartition::new(8, 2, 2);
        assert_eq!(p.core_of(1), Some(0));
        assert_eq!(p.core_of(2), Some(1));
        assert_eq!(p.core_of(8), None);
        assert_eq!(p.range(5), 0..0);
    }
}
