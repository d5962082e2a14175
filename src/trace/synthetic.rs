//! Generating traces from simple branch behaviors.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::branch::*;

/// A pre-determined pattern of outcomes associated with a conditional branch.
#[derive(Clone, Debug, PartialEq)]
pub enum BranchPattern {
    /// A branch whose outcome is always 'taken'.
    AlwaysTaken,

    /// A branch whose outcome is always 'not-taken'.
    NeverTaken,

    /// A branch whose outcome is only periodically "taken".
    /// Otherwise, the branch is "not-taken" by default.
    TakenPeriodic(usize),

    /// A branch whose outcome is only periodically "not-taken".
    /// Otherwise, the branch is "taken" by default.
    NotTakenPeriodic(usize),

    /// A branch with an arbitrary repeating pattern of outcomes.
    Pattern(Vec<Outcome>),

    /// A branch that is taken with some probability.
    Random { p_taken: f64 },

    /// A branch that repeats the outcome of the record `distance` steps
    /// earlier in the trace ('not-taken' until enough records exist).
    Correlated { distance: usize },
}

impl BranchPattern {
    /// Given a per-branch counter and the outcomes so far, generate an
    /// outcome.
    fn outcome(&self, ctr: usize, past: &[Outcome], rng: &mut StdRng)
        -> Outcome
    {
        match self {
            Self::AlwaysTaken => Outcome::T,
            Self::NeverTaken => Outcome::N,
            Self::TakenPeriodic(p) => {
                let p = (*p).max(1);
                Outcome::from(ctr % p == (p - 1))
            },
            Self::NotTakenPeriodic(p) => {
                let p = (*p).max(1);
                Outcome::from(ctr % p != (p - 1))
            },
            Self::Pattern(pat) => {
                if pat.is_empty() { Outcome::N } else { pat[ctr % pat.len()] }
            },
            Self::Random { p_taken } => {
                let p = if p_taken.is_nan() { 0.0 } else { p_taken.clamp(0.0, 1.0) };
                Outcome::from(rng.gen_bool(p))
            },
            Self::Correlated { distance } => {
                past.len().checked_sub(*distance)
                    .and_then(|idx| past.get(idx).copied())
                    .unwrap_or(Outcome::N)
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum SyntheticOp {
    Branch { pc: usize, tgt: usize, pattern: BranchPattern },
    Jump { pc: usize, tgt: usize },
}

/// Builds a trace by visiting a list of branches in round-robin order.
///
/// Random outcomes are drawn from a seeded generator, so the same builder
/// always produces the same trace.
#[derive(Clone, Debug)]
pub struct SyntheticTrace {
    ops: Vec<SyntheticOp>,
    seed: u64,
}
impl SyntheticTrace {
    pub fn new(seed: u64) -> Self {
        Self { ops: Vec::new(), seed }
    }

    /// Add a conditional branch.
    pub fn branch(mut self, pc: usize, tgt: usize, pattern: BranchPattern)
        -> Self
    {
        self.ops.push(SyntheticOp::Branch { pc, tgt, pattern });
        self
    }

    /// Add an unconditional jump.
    pub fn jump(mut self, pc: usize, tgt: usize) -> Self {
        self.ops.push(SyntheticOp::Jump { pc, tgt });
        self
    }

    /// Generate `len` records.
    pub fn generate(&self, len: usize) -> Vec<BranchRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut ctr = vec![0usize; self.ops.len()];
        let mut past: Vec<Outcome> = Vec::with_capacity(len);
        let mut res = Vec::with_capacity(len);
        if self.ops.is_empty() {
            return res;
        }

        for i in 0..len {
            let cur = i % self.ops.len();
            let record = match &self.ops[cur] {
                SyntheticOp::Branch { pc, tgt, pattern } => {
                    let outcome = pattern.outcome(ctr[cur], &past, &mut rng);
                    BranchRecord::conditional(*pc, *tgt, outcome)
                },
                SyntheticOp::Jump { pc, tgt } => {
                    BranchRecord::new(*pc, *tgt, BranchKind::DirectJump, Outcome::T)
                },
            };
            ctr[cur] += 1;
            past.push(record.outcome());
            res.push(record);
        }
        res
    }
}

/// A small mix of branch behaviors, similar in spirit to control-flow
/// microbenchmarks: biased branches, a loop exit, an alternating branch,
/// a noisy branch and a pair of correlated branches.
pub fn microbenchmark(seed: u64) -> SyntheticTrace {
    SyntheticTrace::new(seed)
        .branch(0x1000, 0x1100, BranchPattern::AlwaysTaken)
        .branch(0x1010, 0x1200, BranchPattern::NotTakenPeriodic(8))
        .branch(0x1020, 0x1300, BranchPattern::Pattern(vec![Outcome::T, Outcome::N]))
        .jump(0x1030, 0x1000)
        .branch(0x1040, 0x1400, BranchPattern::Random { p_taken: 0.5 })
        .branch(0x1050, 0x1500, BranchPattern::Correlated { distance: 1 })
        .branch(0x1060, 0x1600, BranchPattern::NeverTaken)
        .branch(0x1070, 0x1700, BranchPattern::TakenPeriodic(3))
}
