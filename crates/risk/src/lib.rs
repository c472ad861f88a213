// In crates/risk/src/lib.rs

pub mod error;
pub mod sizing;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use sizing::PositionSizer;
pub use types::SizingSettings;
