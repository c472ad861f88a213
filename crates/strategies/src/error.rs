// In crates/strategies/src/error.rs

use thiserror::Error;

/// Failures while turning a price series into indicator values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Indicator length for {name} must be at least 1, got {length}")]
    InvalidLength { name: &'static str, length: usize },

    #[error("Invalid close price at bar {index}: {value}")]
    InvalidPrice { index: usize, value: String },

    #[error("Invalid strategy parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, Error>;
