// In crates/strategies/src/signal.rs

use serde::Serialize;

/// Fully-defined indicator values of one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
}

/// Which parts of the short-entry rule hold for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SignalConditions {
    /// `close < ema_fast < ema_slow`
    pub trend: bool,
    /// `rsi > rsi_threshold`
    pub overbought: bool,
    /// `macd < macd_signal`
    pub momentum: bool,
}

impl SignalConditions {
    pub fn check(snapshot: &IndicatorSnapshot, rsi_threshold: f64) -> Self {
        Self {
            trend: snapshot.close < snapshot.ema_fast && snapshot.ema_fast < snapshot.ema_slow,
            overbought: snapshot.rsi > rsi_threshold,
            momentum: snapshot.macd < snapshot.macd_signal,
        }
    }

    pub fn all(&self) -> bool {
        self.trend && self.overbought && self.momentum
    }
}

/// The outcome of evaluating the rule against the latest usable bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalResult {
    pub triggered: bool,
    pub snapshot: Option<IndicatorSnapshot>,
}

impl SignalResult {
    /// No usable bar: never a trigger.
    pub fn empty() -> Self {
        Self {
            triggered: false,
            snapshot: None,
        }
    }
}

/// Applies the short-entry rule. Pure: the same snapshot always gives the same result.
pub fn evaluate(snapshot: Option<&IndicatorSnapshot>, rsi_threshold: f64) -> SignalResult {
    match snapshot {
        Some(snapshot) => SignalResult {
            triggered: SignalConditions::check(snapshot, rsi_threshold).all(),
            snapshot: Some(*snapshot),
        },
        None => SignalResult::empty(),
    }
}
