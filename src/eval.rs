//! Driving a predictor with a trace.

use serde::{ Deserialize, Serialize };
use std::path::Path;

use crate::branch::*;
use crate::error::Result;
use crate::predictor::*;
use crate::stats::BranchStats;

/// Hardware thread context used by the evaluation loop.
const EVAL_TID: ThreadId = 0;

/// Configuration for an evaluation run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    /// Perceptron predictor parameters
    pub perceptron: PerceptronConfig,

    /// Number of entries in the baseline local predictor
    pub local_size: usize,

    /// Whether unconditional branches are shifted into global history
    pub record_unconditional: bool,
}
impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            perceptron: PerceptronConfig::default(),
            local_size: 4096,
            record_unconditional: true,
        }
    }
}
impl EvalConfig {
    /// Read a JSON configuration from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&s)?)
    }

    /// Build the baseline local predictor, using the same index function as
    /// the perceptron predictor.
    pub fn build_local(&self) -> Result<LocalPredictor> {
        LocalConfig {
            ctr: SaturatingCounterConfig::two_bit(Outcome::N),
            size: self.local_size,
            inst_shift_amt: self.perceptron.inst_shift_amt,
        }.build()
    }

    /// Build every predictor compared by an evaluation run.
    pub fn build_all(&self) -> Result<Vec<Box<dyn DirectionPredictor>>> {
        let mut res: Vec<Box<dyn DirectionPredictor>> = Vec::new();
        res.push(Box::new(FixedPredictor::taken()));
        res.push(Box::new(FixedPredictor::not_taken()));
        res.push(Box::new(self.build_local()?));
        res.push(Box::new(self.perceptron.clone().build()?));
        Ok(res)
    }
}

/// Run a predictor over a list of records.
///
/// Each conditional branch is looked up and then updated with its resolved
/// outcome before the next record is considered. When `record_unconditional`
/// is set, other control-flow instructions are recorded in global history as
/// taken.
pub fn evaluate<P>(p: &mut P, records: &[BranchRecord], record_unconditional: bool)
    -> BranchStats
    where P: DirectionPredictor + ?Sized
{
    let mut stat = BranchStats::new();
    for record in records {
        if record.is_conditional() {
            let prediction = p.lookup(EVAL_TID, record.pc);
            stat.update(record, prediction);
            p.update(EVAL_TID, record.pc, record.outcome(), false, record.tgt);
        } else if record_unconditional {
            p.update_histories(EVAL_TID, record.pc, true, true, record.tgt);
        }
    }
    log::debug!("{}: {}/{} correct", p.name(), stat.global_hits(), stat.global_brns());
    stat
}
