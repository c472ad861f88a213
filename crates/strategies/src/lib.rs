// In crates/strategies/src/lib.rs

use core_types::PriceSeries;

pub mod error;
pub mod indicators;
pub mod short_reversal;
pub mod signal;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use short_reversal::ShortReversal;
pub use signal::{IndicatorSnapshot, SignalConditions, SignalResult};
pub use types::ShortReversalSettings;

/// The universal interface for a trading strategy.
///
/// A strategy analyzes a freshly fetched price series and decides whether its
/// entry rule fires on the latest usable bar. It keeps no state between calls,
/// so the same series always produces the same result.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// The number of bars needed before the strategy can produce a snapshot.
    fn longest_lookback(&self) -> usize;

    fn assess(&self, series: &PriceSeries) -> Result<SignalResult>;
}
