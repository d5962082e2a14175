//! A perceptron branch direction predictor, with the baseline predictors,
//! traces and statistics used to evaluate it.

pub mod branch;
pub mod error;
pub mod eval;
pub mod history;
pub mod predictor;
pub mod stats;
pub mod trace;

pub use branch::*;
pub use error::{ Error, Result };
pub use history::*;
pub use predictor::*;
pub use trace::*;
