// In crates/strategies/src/types.rs

use serde::{Deserialize, Serialize};

/// The RSI window is fixed; only its overbought threshold is configurable.
pub const RSI_LENGTH: usize = 14;

/// Parameters of the short-reversal rule and the indicators it reads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShortReversalSettings {
    /// Length of the fast trend EMA.
    pub ema_fast_len: usize,
    /// Length of the slow trend EMA.
    pub ema_slow_len: usize,
    /// RSI level above which the market counts as overbought.
    pub rsi_threshold: f64,
    pub macd_fast_len: usize,
    pub macd_slow_len: usize,
    pub macd_signal_len: usize,
}

impl Default for ShortReversalSettings {
    fn default() -> Self {
        Self {
            ema_fast_len: 20,
            ema_slow_len: 50,
            rsi_threshold: 70.0,
            macd_fast_len: 12,
            macd_slow_len: 26,
            macd_signal_len: 9,
        }
    }
}

impl ShortReversalSettings {
    /// The number of bars needed before every indicator has a value.
    pub fn longest_lookback(&self) -> usize {
        self.ema_fast_len
            .max(self.ema_slow_len)
            .max(RSI_LENGTH + 1)
            .max(
                self.macd_fast_len.max(self.macd_slow_len)
                    + self.macd_signal_len.saturating_sub(1),
            )
    }
}
