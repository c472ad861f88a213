// In crates/api-client/src/lib.rs

use async_trait::async_trait;
use core_types::{PriceSeries, Symbol};
use rust_decimal::Decimal;
use std::collections::HashMap;

pub mod bitso;
pub mod error;
pub mod types;

// Re-export public types
pub use bitso::BitsoClient;
pub use error::{Error, Result};

/// The universal interface for a market-data source.
///
/// The cycle orchestrator only ever talks to the exchange through this trait,
/// which keeps it testable with in-memory fakes.
#[async_trait]
pub trait MarketData {
    /// The name of the data source (e.g., "Bitso").
    fn name(&self) -> &'static str;

    /// Fetches the most recent `limit` bars of `interval_secs` seconds each.
    ///
    /// The returned series is ordered by open time with duplicates removed.
    async fn fetch_recent_bars(
        &self,
        symbol: &Symbol,
        interval_secs: u32,
        limit: usize,
    ) -> Result<PriceSeries>;

    /// Fetches the last traded price of `symbol`.
    async fn fetch_last_price(&self, symbol: &Symbol) -> Result<Decimal>;

    /// Fetches the available balance of every currency held, keyed by lowercase code.
    async fn fetch_balance(&self) -> Result<HashMap<String, Decimal>>;
}
