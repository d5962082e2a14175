//! Error types.

use thiserror::Error;

/// Errors produced while configuring a predictor or loading a trace.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid number of perceptrons: {0} is not a power of two")]
    InvalidTableSize(usize),

    #[error("invalid history size: history_length ({0}) + 1 is not a power of two")]
    InvalidHistoryLength(usize),

    #[error("invalid weight width: {0} bits (expected 2..=32)")]
    InvalidWeightBits(u32),

    #[error("invalid trace '{name}': {len} bytes is not a multiple of the record size")]
    InvalidTraceLength { name: String, len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
