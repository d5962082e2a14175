//! Implementation of a perceptron branch direction predictor.

pub mod config;
pub mod stat;
pub mod weights;

pub use config::*;
pub use stat::*;
pub use weights::*;

use bitvec::prelude::*;

use crate::branch::{ Outcome, ThreadId };
use crate::error::Result;
use crate::history::HistoryRegister;
use crate::predictor::*;

/// The global history bits observed by some lookup.
///
/// Passing this back to [PerceptronPredictor::update_with_snapshot] trains
/// the perceptron against the history that produced the prediction, even if
/// other branches have advanced global history in the meantime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySnapshot {
    bits: BitVec<usize, Lsb0>,
}
impl HistorySnapshot {
    pub fn bits(&self) -> &BitSlice<usize, Lsb0> { &self.bits }
}

/// A table of perceptrons indexed by the program counter, sharing a single
/// global history register.
///
/// See "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001).
///
/// NOTE: [DirectionPredictor::update] recomputes the output with the
/// *current* global history. This is only correct when no other branch has
/// been resolved between a lookup and the matching update. Use
/// [PerceptronPredictor::lookup_with_snapshot] when that doesn't hold.
#[derive(Clone, Debug)]
pub struct PerceptronPredictor {
    /// The configuration used to create this object
    cfg: PerceptronConfig,

    /// Training threshold (theta)
    threshold: i32,

    /// Mask for indexing the table
    index_mask: usize,

    /// Bounds on each weight
    range: WeightRange,

    /// One perceptron for each table entry
    table: Vec<Perceptron>,

    /// Global history register
    ghr: HistoryRegister,

    stat: PerceptronStats,
}

impl PerceptronPredictor {
    /// Create a predictor, validating the table layout.
    pub fn new(cfg: PerceptronConfig) -> Result<Self> {
        cfg.build()
    }

    pub fn config(&self) -> &PerceptronConfig { &self.cfg }
    pub fn threshold(&self) -> i32 { self.threshold }
    pub fn weight_range(&self) -> WeightRange { self.range }
    pub fn history(&self) -> &HistoryRegister { &self.ghr }
    pub fn stats(&self) -> &PerceptronStats { &self.stat }

    /// Return the perceptron at some index in the table.
    pub fn weights(&self, idx: usize) -> &Perceptron {
        self.get_entry(idx)
    }

    /// Compute the table index for a branch address.
    pub fn get_local_index(&self, pc: usize) -> usize {
        pc_index(pc, self.cfg.inst_shift_amt, self.index_mask)
    }

    /// The slice of global history that feeds each perceptron.
    fn relevant_history(&self) -> &BitSlice<usize, Lsb0> {
        self.ghr.read(0..self.cfg.history_length)
    }

    /// Compute the perceptron output for a branch address.
    pub fn output(&self, pc: usize) -> i64 {
        let idx = self.get_local_index(pc);
        self.table[idx].output(self.relevant_history())
    }

    /// Make a prediction and capture the history used to make it.
    pub fn lookup_with_snapshot(&self, tid: ThreadId, pc: usize)
        -> (Outcome, HistorySnapshot)
    {
        let snapshot = HistorySnapshot {
            bits: self.relevant_history().to_bitvec(),
        };
        (self.lookup(tid, pc), snapshot)
    }

    /// Like [DirectionPredictor::update], but train with the history
    /// captured by [PerceptronPredictor::lookup_with_snapshot].
    ///
    /// Global history is still advanced from its current state.
    pub fn update_with_snapshot(&mut self,
        tid: ThreadId,
        pc: usize,
        outcome: Outcome,
        squashed: bool,
        target: usize,
        snapshot: &HistorySnapshot,
    )
    {
        if squashed {
            self.stat.squashed += 1;
            return;
        }
        let idx = self.get_local_index(pc);
        let res = self.table[idx].train(
            snapshot.bits(), outcome, self.threshold, self.range
        );
        self.record_training(idx, outcome, res);
        self.update_histories(tid, pc, false, outcome.into(), target);
    }

    fn record_training(&mut self, idx: usize, outcome: Outcome, res: Training) {
        self.stat.updates += 1;
        match res {
            Training::Skipped => {
                self.stat.skipped += 1;
                log::trace!("index {:#x}: confident, no training", idx);
            },
            Training::Trained { mispredicted } => {
                self.stat.trained += 1;
                if mispredicted {
                    self.stat.mispredicted += 1;
                }
                log::trace!("index {:#x}: trained as {:?} (mispredicted={})",
                    idx, outcome, mispredicted
                );
            },
        }
    }
}

impl PredictorTable for PerceptronPredictor {
    type Input = usize;
    type Entry = Perceptron;

    fn size(&self) -> usize { self.table.len() }

    fn get_index(&self, pc: usize) -> usize {
        self.get_local_index(pc)
    }

    fn get_entry(&self, idx: usize) -> &Perceptron {
        &self.table[idx & self.index_mask]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut Perceptron {
        &mut self.table[idx & self.index_mask]
    }

    fn index_mask(&self) -> usize { self.index_mask }
}

impl DirectionPredictor for PerceptronPredictor {
    fn name(&self) -> &'static str { "PerceptronPredictor" }

    fn reset(&mut self) {
        for entry in self.table.iter_mut() {
            entry.reset();
        }
        self.ghr.clear();
        self.stat = PerceptronStats::default();
    }

    fn lookup(&self, _tid: ThreadId, pc: usize) -> Outcome {
        let idx = self.get_local_index(pc);
        let y = self.table[idx].output(self.relevant_history());
        log::trace!("lookup {:#x}: index {:#x}, output {}", pc, idx, y);
        Outcome::from_output(y)
    }

    fn update(&mut self,
        tid: ThreadId,
        pc: usize,
        outcome: Outcome,
        squashed: bool,
        target: usize,
    )
    {
        // No state to restore, and we do not update on the wrong path.
        if squashed {
            self.stat.squashed += 1;
            return;
        }

        let idx = self.get_local_index(pc);
        let history = self.ghr.read(0..self.cfg.history_length);
        let res = self.table[idx].train(
            history, outcome, self.threshold, self.range
        );
        self.record_training(idx, outcome, res);
        self.update_histories(tid, pc, false, outcome.into(), target);
    }

    fn update_histories(&mut self,
        _tid: ThreadId,
        _pc: usize,
        _unconditional: bool,
        taken: bool,
        _target: usize,
    )
    {
        self.ghr.push(Outcome::from(taken));
    }
}


#[cfg(test)]
mod test {
    use super::*;

    fn build(n_perceptron: usize, history_length: usize, threshold: i32)
        -> PerceptronPredictor
    {
        PerceptronConfig {
            n_perceptron,
            history_length,
            threshold: Some(threshold),
            inst_shift_amt: 2,
            weight_bits: None,
        }.build().unwrap()
    }

    #[test]
    fn zero_weights_predict_taken() {
        let p = build(2, 3, 0);
        assert_eq!(p.output(0x1000), 0);
        assert_eq!(p.lookup(0, 0x1000), Outcome::T);
    }

    #[test]
    fn misprediction_trains_toward_outcome() {
        let mut p = build(2, 3, 0);
        let pc = 0x1000;
        assert_eq!(p.get_local_index(pc), 0);
        assert_eq!(p.lookup(0, pc), Outcome::T);

        p.update(0, pc, Outcome::N, false, 0);
        let entry = p.weights(0);
        assert_eq!(entry.bias, -1);
        // Every history bit was clear (x = -1), and t = -1
        assert_eq!(entry.weights(), &[1, 1, 1]);
        assert_eq!(p.history().as_u64(), 0);
        assert_eq!(p.stats().mispredicted, 1);

        // y = -1 - 1 - 1 - 1
        assert_eq!(p.output(pc), -4);
        assert_eq!(p.lookup(0, pc), Outcome::N);
    }

    #[test]
    fn weak_correct_prediction_still_trains() {
        let mut p = build(2, 3, 1);
        p.update(0, 0x1000, Outcome::T, false, 0);
        let entry = p.weights(0);
        assert_eq!(entry.bias, 1);
        assert_eq!(entry.weights(), &[-1, -1, -1]);
        assert_eq!(p.stats().trained, 1);
        assert_eq!(p.stats().mispredicted, 0);
    }

    #[test]
    fn zero_threshold_skips_correct_tie() {
        let mut p = build(2, 3, 0);
        p.update(0, 0x1000, Outcome::T, false, 0);
        assert_eq!(p.weights(0), &Perceptron::new(3));
        assert_eq!(p.stats().skipped, 1);
        assert_eq!(p.history().as_u64(), 1);
    }

    #[test]
    fn confident_prediction_skips_training() {
        let mut p = build(2, 3, 2);
        p.get_entry_mut(0).bias = 5;
        p.get_entry_mut(1).bias = -5;
        let before0 = p.weights(0).clone();
        let before1 = p.weights(1).clone();

        p.update(0, 0x1000, Outcome::T, false, 0);
        assert_eq!(p.weights(0), &before0);
        assert_eq!(p.history().as_u64(), 0b1);

        // All history weights are still zero, so y = -5
        p.update(0, 0x1004, Outcome::N, false, 0);
        assert_eq!(p.weights(1), &before1);
        assert_eq!(p.history().as_u64(), 0b10);
        assert_eq!(p.stats().skipped, 2);
        assert_eq!(p.stats().trained, 0);
    }

    #[test]
    fn squashed_update_is_noop() {
        let mut p = build(4, 7, 10);
        for i in 0..8 {
            p.update(0, 0x1000 + (i * 4), Outcome::from(i % 3 == 0), false, 0);
        }
        let table = p.table.clone();
        let ghr = p.history().clone();

        p.update(0, 0x1000, Outcome::T, true, 0);
        p.update(0, 0x1004, Outcome::N, true, 0);
        assert_eq!(p.table, table);
        assert_eq!(p.history(), &ghr);
        assert_eq!(p.stats().squashed, 2);
    }

    #[test]
    fn update_histories_shifts_in_outcome() {
        let mut p = build(2, 7, 10);
        p.update_histories(0, 0x1000, true, true, 0x2000);
        p.update_histories(0, 0x1000, true, false, 0x2000);
        p.update_histories(0, 0x1000, true, true, 0x2000);
        assert_eq!(p.history().as_u64(), 0b101);
    }

    #[test]
    fn snapshot_trains_with_captured_history() {
        let mut base = build(2, 3, 0);
        let mut snap = build(2, 3, 0);

        let (pred, snapshot) = snap.lookup_with_snapshot(0, 0x1000);
        assert_eq!(pred, Outcome::T);
        assert_eq!(snapshot.bits().len(), 3);

        // Another branch resolves before the first one is updated
        base.update_histories(0, 0x2000, true, true, 0);
        snap.update_histories(0, 0x2000, true, true, 0);

        base.update(0, 0x1000, Outcome::N, false, 0);
        snap.update_with_snapshot(0, 0x1000, Outcome::N, false, 0, &snapshot);

        // Current history had bit 0 set
        assert_eq!(base.weights(0).weights(), &[-1, 1, 1]);
        // Captured history was all clear
        assert_eq!(snap.weights(0).weights(), &[1, 1, 1]);
        assert_eq!(snap.history().as_u64(), base.history().as_u64());
    }

    #[test]
    fn weights_saturate_at_configured_width() {
        let mut p = PerceptronConfig {
            n_perceptron: 2,
            history_length: 3,
            threshold: Some(1000),
            inst_shift_amt: 2,
            weight_bits: Some(2),
        }.build().unwrap();

        for _ in 0..20 {
            p.update(0, 0x1000, Outcome::T, false, 0);
        }
        let entry = p.weights(0);
        assert_eq!(entry.bias, 1);
        assert!(entry.weights().iter().all(|w| (-2..=1).contains(w)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut p = build(4, 7, 10);
        for i in 0..32 {
            p.update(0, 0x1000 + (i % 4) * 4, Outcome::from(i % 2 == 0), false, 0);
        }
        p.reset();
        assert!(p.table.iter().all(|e| *e == Perceptron::new(7)));
        assert_eq!(p.history().as_u64(), 0);
        assert_eq!(p.stats(), &PerceptronStats::default());
    }

    #[test]
    fn learns_loop_exit() {
        let mut p = build(16, 7, derive_threshold(7));
        let pattern = [Outcome::T, Outcome::T, Outcome::T, Outcome::N];
        let pc = 0x4000;
        let mut hits = 0;
        for i in 0..400 {
            let outcome = pattern[i % pattern.len()];
            let prediction = p.lookup(0, pc);
            if i >= 360 && prediction == outcome {
                hits += 1;
            }
            p.update(0, pc, outcome, false, 0);
        }
        assert_eq!(hits, 40);
    }
}
