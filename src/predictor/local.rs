//! A pattern history table (PHT) of saturating counters indexed by the
//! program counter.

use crate::branch::{ Outcome, ThreadId };
use crate::error::{ Error, Result };
use crate::predictor::*;

/// Configuration for a [`LocalPredictor`].
#[derive(Clone, Copy, Debug)]
pub struct LocalConfig {
    /// Parameters for the saturating counters
    pub ctr: SaturatingCounterConfig,

    /// Number of entries
    pub size: usize,

    /// Number of low program counter bits to discard when indexing
    pub inst_shift_amt: u32,
}
impl LocalConfig {
    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        self.ctr.storage_bits() * self.size
    }

    /// Use this configuration to create a new [`LocalPredictor`].
    pub fn build(self) -> Result<LocalPredictor> {
        if !self.size.is_power_of_two() {
            return Err(Error::InvalidTableSize(self.size));
        }
        log::debug!("local predictor: {} entries, {} storage bits",
            self.size, self.storage_bits()
        );
        Ok(LocalPredictor {
            data: vec![self.ctr.build(); self.size],
            cfg: self,
        })
    }
}

/// A table of [SaturatingCounter] indexed by the program counter.
///
/// There is no history: each entry only follows the branches that alias
/// into it.
#[derive(Clone, Debug)]
pub struct LocalPredictor {
    cfg: LocalConfig,

    /// Table of counters
    data: Vec<SaturatingCounter>,
}
impl LocalPredictor {
    pub fn config(&self) -> &LocalConfig { &self.cfg }
}

impl PredictorTable for LocalPredictor {
    type Input = usize;
    type Entry = SaturatingCounter;

    fn size(&self) -> usize { self.cfg.size }

    fn get_index(&self, pc: usize) -> usize {
        pc_index(pc, self.cfg.inst_shift_amt, self.index_mask())
    }

    fn get_entry(&self, idx: usize) -> &SaturatingCounter {
        &self.data[idx & self.index_mask()]
    }

    fn get_entry_mut(&mut self, idx: usize) -> &mut SaturatingCounter {
        let index = idx & self.index_mask();
        &mut self.data[index]
    }
}

impl DirectionPredictor for LocalPredictor {
    fn name(&self) -> &'static str { "LocalPredictor" }

    fn reset(&mut self) {
        for ctr in self.data.iter_mut() {
            ctr.reset();
        }
    }

    fn lookup(&self, _tid: ThreadId, pc: usize) -> Outcome {
        self.get_entry(self.get_index(pc)).predict()
    }

    fn update(&mut self, _tid: ThreadId, pc: usize, outcome: Outcome,
        squashed: bool, _target: usize)
    {
        // Nothing to restore, and we do not train on the wrong path.
        if squashed {
            return;
        }
        let idx = self.get_index(pc);
        self.get_entry_mut(idx).update(outcome);
    }

    fn update_histories(&mut self, _tid: ThreadId, _pc: usize,
        _unconditional: bool, _taken: bool, _target: usize) {}
}
