
use crate::branch::{ Outcome, ThreadId };
use crate::predictor::DirectionPredictor;

/// A predictor with no state: always predict the same outcome.
#[derive(Clone, Copy, Debug)]
pub struct FixedPredictor(pub Outcome);
impl FixedPredictor {
    /// Always predict 'taken'.
    pub fn taken() -> Self { Self(Outcome::T) }

    /// Always predict 'not-taken'.
    pub fn not_taken() -> Self { Self(Outcome::N) }
}

impl DirectionPredictor for FixedPredictor {
    fn name(&self) -> &'static str {
        match self.0 {
            Outcome::T => "TakenPredictor",
            Outcome::N => "NotTakenPredictor",
        }
    }
    fn reset(&mut self) {}
    fn lookup(&self, _tid: ThreadId, _pc: usize) -> Outcome { self.0 }
    fn update(&mut self, _tid: ThreadId, _pc: usize, _outcome: Outcome,
        _squashed: bool, _target: usize) {}
    fn update_histories(&mut self, _tid: ThreadId, _pc: usize,
        _unconditional: bool, _taken: bool, _target: usize) {}
}
