// In crates/risk/src/types.rs

use serde::{Deserialize, Serialize};

/// Fixed-fraction sizing parameters.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SizingSettings {
    /// Fraction of the quote balance committed per signal, in `(0, 1]`.
    pub trade_percent: f64,
    /// Decimal places the base-asset amount is rounded to.
    pub amount_precision: u32,
}

impl Default for SizingSettings {
    fn default() -> Self {
        Self {
            trade_percent: 0.03,
            amount_precision: 6,
        }
    }
}
