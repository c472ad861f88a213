// In crates/engine/src/error.rs

use std::fmt;
use thiserror::Error;

/// The step of a cycle that was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStage {
    Fetching,
    Computing,
    Acting,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CycleStage::Fetching => "fetching",
            CycleStage::Computing => "computing",
            CycleStage::Acting => "acting",
        })
    }
}

/// A failure that ended one cycle. The loop logs it and carries on.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Failed to fetch market data: {0}")]
    Fetch(#[source] api_client::Error),

    #[error("Failed to compute indicators: {0}")]
    Compute(#[source] strategies::Error),

    #[error("Failed to fetch account data: {0}")]
    Account(#[source] api_client::Error),

    #[error("Failed to size the order: {0}")]
    Sizing(#[source] risk::Error),
}

impl CycleError {
    pub fn stage(&self) -> CycleStage {
        match self {
            CycleError::Fetch(_) => CycleStage::Fetching,
            CycleError::Compute(_) => CycleStage::Computing,
            CycleError::Account(_) | CycleError::Sizing(_) => CycleStage::Acting,
        }
    }
}
