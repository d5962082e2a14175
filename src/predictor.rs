//! Implementations of different branch direction predictors.

pub mod table;
pub mod counter;
pub mod fixed;
pub mod local;
pub mod perceptron;

pub use table::*;
pub use counter::*;
pub use fixed::*;
pub use local::*;
pub use perceptron::*;

use crate::branch::{ Outcome, ThreadId };

/// Interface to a predictor that guesses the direction of a conditional
/// branch and learns from the resolved outcome.
///
/// A pipeline calls [DirectionPredictor::lookup] when a branch is fetched,
/// and later calls [DirectionPredictor::update] once the branch resolves
/// (or is squashed). Only the direction is predicted: `target` arguments are
/// accepted for interface compatibility and otherwise ignored.
pub trait DirectionPredictor {
    fn name(&self) -> &'static str;

    /// Reset the internal state of the predictor.
    fn reset(&mut self);

    /// Predict the direction of the branch at `pc`.
    fn lookup(&self, tid: ThreadId, pc: usize) -> Outcome;

    /// Train the predictor with the resolved outcome of the branch at `pc`.
    /// A squashed branch must not change any state.
    fn update(&mut self,
        tid: ThreadId,
        pc: usize,
        outcome: Outcome,
        squashed: bool,
        target: usize,
    );

    /// Record the outcome of some branch in the predictor's history.
    fn update_histories(&mut self,
        tid: ThreadId,
        pc: usize,
        unconditional: bool,
        taken: bool,
        target: usize,
    );
}
