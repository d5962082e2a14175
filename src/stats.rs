//! Helpers for collecting statistics.

use std::collections::*;
use bitvec::prelude::*;
use itertools::*;

use crate::branch::*;

/// Container for recording simple statistics while evaluating some model.
#[derive(Clone, Debug, Default)]
pub struct BranchStats {
    /// Per-branch statistics (indexed by program counter value).
    pub data: BTreeMap<usize, BranchData>,

    /// Number of correct predictions
    pub global_hits: usize,

    /// Number of times any conditional branch instruction was executed
    pub global_brns: usize,
}
impl BranchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the global hit rate.
    pub fn hit_rate(&self) -> f64 {
        if self.global_brns == 0 { return 0.0; }
        self.global_hits as f64 / self.global_brns as f64
    }

    /// Return the global hit count.
    pub fn global_hits(&self) -> usize { self.global_hits }

    /// Return the global miss count.
    pub fn global_miss(&self) -> usize { self.global_brns - self.global_hits }

    /// Return the total branch count.
    pub fn global_brns(&self) -> usize { self.global_brns }

    /// Mispredictions per thousand branches.
    pub fn mpkb(&self) -> f64 {
        if self.global_brns == 0 { return 0.0; }
        self.global_miss() as f64 * 1000.0 / self.global_brns as f64
    }

    /// Record a prediction for some branch.
    pub fn update(&mut self, record: &BranchRecord, prediction: Outcome) {
        let outcome = record.outcome();
        let hit = prediction == outcome;
        self.global_brns += 1;
        if hit { self.global_hits += 1; }

        let data = self.get_mut(record.pc);
        data.occ += 1;
        data.pat.push(outcome.into());
        if hit { data.hits += 1; }
    }

    /// Returns a reference to data collected for a particular branch.
    pub fn get(&self, pc: usize) -> Option<&BranchData> {
        self.data.get(&pc)
    }

    /// Returns a mutable reference to data collected for a particular branch.
    /// Creates a new entry if one doesn't already exist.
    pub fn get_mut(&mut self, pc: usize) -> &mut BranchData {
        self.data.entry(pc).or_default()
    }

    /// Returns the number of unique observed branch instructions.
    pub fn num_unique_branches(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of branches that are always taken
    pub fn num_always_taken(&self) -> usize {
        self.data.values().filter(|entry| entry.is_always_taken()).count()
    }

    /// Returns the number of branches that are never taken
    pub fn num_never_taken(&self) -> usize {
        self.data.values().filter(|entry| entry.is_never_taken()).count()
    }

    /// Return the `n` most frequently executed branches.
    pub fn get_common_branches(&self, n: usize) -> Vec<(usize, &BranchData)> {
        self.data.iter()
            .sorted_by_key(|(pc, s)| (std::cmp::Reverse(s.occ), **pc))
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }

    /// Return at most `n` branches executed more than `min_occ` times with
    /// a hit rate at or below `max_rate`, most frequent first.
    pub fn get_low_rate_branches(&self, n: usize, min_occ: usize, max_rate: f64)
        -> Vec<(usize, &BranchData)>
    {
        self.data.iter()
            .filter(|(_, s)| s.occ > min_occ && s.hit_rate() <= max_rate)
            .sorted_by_key(|(pc, s)| (std::cmp::Reverse(s.occ), **pc))
            .take(n)
            .map(|(pc, s)| (*pc, s))
            .collect()
    }
}

/// Container for per-branch statistics.
#[derive(Clone, Debug, Default)]
pub struct BranchData {
    /// Number of times this branch was encountered.
    pub occ: usize,

    /// Number of correct predictions for this branch.
    pub hits: usize,

    /// Record of all observed outcomes for this branch.
    pub pat: BitVec,
}
impl BranchData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the hit rate for this branch.
    pub fn hit_rate(&self) -> f64 {
        if self.occ == 0 { return 0.0; }
        self.hits as f64 / self.occ as f64
    }

    pub fn is_always_taken(&self) -> bool {
        self.pat.count_ones() == self.pat.len()
    }

    pub fn is_never_taken(&self) -> bool {
        self.pat.count_zeros() == self.pat.len()
    }

    pub fn times_taken(&self) -> usize {
        self.pat.count_ones()
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn global_and_per_branch_counts() {
        let mut stat = BranchStats::new();
        let a = BranchRecord::conditional(0x10, 0x40, Outcome::T);
        let b = BranchRecord::conditional(0x20, 0x40, Outcome::N);
        stat.update(&a, Outcome::T);
        stat.update(&a, Outcome::N);
        stat.update(&b, Outcome::N);

        assert_eq!(stat.global_brns(), 3);
        assert_eq!(stat.global_hits(), 2);
        assert_eq!(stat.global_miss(), 1);
        assert!((stat.mpkb() - 333.333).abs() < 0.01);
        assert_eq!(stat.num_unique_branches(), 2);
        assert_eq!(stat.num_always_taken(), 1);
        assert_eq!(stat.num_never_taken(), 1);

        let data = stat.get(0x10).unwrap();
        assert_eq!(data.occ, 2);
        assert_eq!(data.times_taken(), 2);
        assert_eq!(data.hit_rate(), 0.5);
    }

    #[test]
    fn ranking_branches() {
        let mut stat = BranchStats::new();
        let hot = BranchRecord::conditional(0x10, 0x40, Outcome::T);
        let cold = BranchRecord::conditional(0x20, 0x40, Outcome::T);
        for i in 0..10 {
            stat.update(&hot, Outcome::from(i % 2 == 0));
        }
        for _ in 0..4 {
            stat.update(&cold, Outcome::N);
        }

        let common = stat.get_common_branches(1);
        assert_eq!(common.len(), 1);
        assert_eq!(common[0].0, 0x10);

        let low = stat.get_low_rate_branches(8, 2, 0.55);
        let pcs: Vec<usize> = low.iter().map(|(pc, _)| *pc).collect();
        assert_eq!(pcs, vec![0x10, 0x20]);
        assert!(stat.get_low_rate_branches(8, 5, 0.55).len() == 1);
    }

    #[test]
    fn empty_stats_do_not_divide_by_zero() {
        let stat = BranchStats::new();
        assert_eq!(stat.hit_rate(), 0.0);
        assert_eq!(stat.mpkb(), 0.0);
    }
}
