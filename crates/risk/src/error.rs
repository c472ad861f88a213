// In crates/risk/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid sizing parameters: {0}")]
    InvalidParameters(String),

    #[error("Cannot size an order at a non-positive price: {0}")]
    InvalidPrice(String),

    #[error("Order size overflowed for balance {balance} at price {price}")]
    Overflow { balance: String, price: String },
}

pub type Result<T> = std::result::Result<T, Error>;
