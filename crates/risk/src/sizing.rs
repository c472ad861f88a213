// In crates/risk/src/sizing.rs

use crate::types::SizingSettings;
use crate::{Error, Result};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Fixed-fraction position sizer.
///
/// Commits `trade_percent` of the available quote balance to each signal and
/// converts it to a base-asset amount at the current price.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    fraction: Decimal,
    precision: u32,
}

impl PositionSizer {
    /// Creates a new `PositionSizer`, rejecting fractions outside `(0, 1]`.
    pub fn new(settings: &SizingSettings) -> Result<Self> {
        let pct = settings.trade_percent;
        if !pct.is_finite() || pct <= 0.0 || pct > 1.0 {
            return Err(Error::InvalidParameters(format!(
                "trade_percent must be within (0, 1], got {pct}"
            )));
        }
        let fraction = Decimal::from_f64(pct).ok_or_else(|| {
            Error::InvalidParameters(format!("trade_percent {pct} is not representable"))
        })?;

        Ok(Self {
            fraction,
            precision: settings.amount_precision,
        })
    }

    /// `round(balance * trade_percent / price, precision)`, half to even, without trailing zeros.
    ///
    /// A zero balance sizes to zero; a non-positive price is an error.
    pub fn order_size(&self, balance: Decimal, price: Decimal) -> Result<Decimal> {
        if price <= Decimal::ZERO {
            return Err(Error::InvalidPrice(price.to_string()));
        }
        let balance = balance.max(Decimal::ZERO);

        let amount = balance
            .checked_mul(self.fraction)
            .and_then(|committed| committed.checked_div(price))
            .ok_or_else(|| Error::Overflow {
                balance: balance.to_string(),
                price: price.to_string(),
            })?;

        let rounded = amount
            .round_dp_with_strategy(self.precision, RoundingStrategy::MidpointNearestEven)
            .normalize();
        tracing::debug!(%balance, %price, %rounded, "Sized order.");
        Ok(rounded)
    }
}
