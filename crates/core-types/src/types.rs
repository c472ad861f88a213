// In crates/core-types/src/types.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An exchange order book identifier in `base_quote` form (e.g., "btc_mxn").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// The asset being priced (`btc` in `btc_mxn`).
    pub fn base_currency(&self) -> &str {
        self.0.split_once('_').map(|(base, _)| base).unwrap_or(&self.0)
    }

    /// The currency prices and balances are quoted in (`mxn` in `btc_mxn`).
    pub fn quote_currency(&self) -> &str {
        self.0.split_once('_').map(|(_, quote)| quote).unwrap_or(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single OHLCV bar for one time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Bucket start time in milliseconds since the Unix epoch.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// A bounded, time-ordered window of klines.
///
/// Timestamps are strictly increasing and never duplicated. The series is fetched
/// fresh every cycle and is never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Kline>,
}

impl PriceSeries {
    /// Builds a series from bars in any order.
    ///
    /// Bars are sorted by `open_time`; when two bars share a timestamp the one that
    /// appears later in `bars` wins. Only the newest `max_len` bars are kept.
    pub fn from_bars(mut bars: Vec<Kline>, max_len: usize) -> Self {
        // A stable sort keeps arrival order within equal timestamps.
        bars.sort_by_key(|k| k.open_time);

        let mut deduped: Vec<Kline> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.open_time == bar.open_time => *last = bar,
                _ => deduped.push(bar),
            }
        }

        if deduped.len() > max_len {
            deduped.drain(..deduped.len() - max_len);
        }

        Self { bars: deduped }
    }

    pub fn bars(&self) -> &[Kline] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar, if any.
    pub fn last(&self) -> Option<&Kline> {
        self.bars.last()
    }
}

/// The kind of simulated trade a signal produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalType {
    Short,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Short => "short",
        }
    }

    /// Parses the lowercase name written by `as_str`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "short" => Some(SignalType::Short),
            _ => None,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An append-only record of a simulated trade, written when a signal triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub timestamp: DateTime<Utc>,
    pub symbol: Symbol,
    /// Last traded price at the time of the signal, in the quote currency.
    pub price: Decimal,
    /// Estimated order size in the base currency.
    pub amount: Decimal,
    pub signal_type: SignalType,
}
