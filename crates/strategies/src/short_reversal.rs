// In crates/strategies/src/short_reversal.rs

use crate::indicators::{compute_indicators, last_usable};
use crate::signal::{SignalResult, evaluate};
use crate::types::ShortReversalSettings;
use crate::{Error, Result, Strategy};
use core_types::PriceSeries;

/// Short entry on an overbought bounce inside a downtrend.
///
/// Fires when the close sits below the fast EMA, the fast EMA below the slow EMA,
/// RSI is above the threshold and the MACD main line is under its signal line.
#[derive(Debug, Clone)]
pub struct ShortReversal {
    settings: ShortReversalSettings,
}

impl ShortReversal {
    /// Creates a new `ShortReversal` strategy, rejecting unusable parameters.
    pub fn new(settings: ShortReversalSettings) -> Result<Self> {
        let lengths = [
            ("ema_fast_len", settings.ema_fast_len),
            ("ema_slow_len", settings.ema_slow_len),
            ("macd_fast_len", settings.macd_fast_len),
            ("macd_slow_len", settings.macd_slow_len),
            ("macd_signal_len", settings.macd_signal_len),
        ];
        if let Some((name, length)) = lengths.into_iter().find(|(_, length)| *length == 0) {
            return Err(Error::InvalidLength { name, length });
        }
        if !(0.0..=100.0).contains(&settings.rsi_threshold) {
            return Err(Error::InvalidParameter(format!(
                "rsi_threshold must be within [0, 100], got {}",
                settings.rsi_threshold
            )));
        }

        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ShortReversalSettings {
        &self.settings
    }
}

impl Strategy for ShortReversal {
    fn name(&self) -> &'static str {
        "ShortReversal"
    }

    fn longest_lookback(&self) -> usize {
        self.settings.longest_lookback()
    }

    fn assess(&self, series: &PriceSeries) -> Result<SignalResult> {
        let rows = compute_indicators(series, &self.settings)?;
        let snapshot = last_usable(&rows);
        Ok(evaluate(snapshot.as_ref(), self.settings.rsi_threshold))
    }
}
