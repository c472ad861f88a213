// In crates/strategies/src/indicators.rs

//! Batch indicator calculations over a close-price series.
//!
//! Every function returns one cell per input bar. A cell is `None` until the
//! indicator has seen enough history; callers must never treat `None` as zero.

use crate::signal::IndicatorSnapshot;
use crate::types::{RSI_LENGTH, ShortReversalSettings};
use crate::{Error, Result};
use core_types::PriceSeries;
use rust_decimal::prelude::ToPrimitive;
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// The indicator values computed for a single bar.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub open_time: i64,
    pub close: f64,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
}

impl IndicatorRow {
    /// Returns the row as a snapshot if every required cell is defined.
    pub fn snapshot(&self) -> Option<IndicatorSnapshot> {
        Some(IndicatorSnapshot {
            close: self.close,
            ema_fast: self.ema_fast?,
            ema_slow: self.ema_slow?,
            rsi: self.rsi?,
            macd: self.macd?,
            macd_signal: self.macd_signal?,
            macd_histogram: self.macd_histogram?,
        })
    }
}

/// The three MACD lines, one cell per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Computes every indicator the short-reversal rule reads, bar by bar.
pub fn compute_indicators(
    series: &PriceSeries,
    settings: &ShortReversalSettings,
) -> Result<Vec<IndicatorRow>> {
    let closes = closes(series)?;

    let ema_fast = ema(&closes, settings.ema_fast_len)?;
    let ema_slow = ema(&closes, settings.ema_slow_len)?;
    let rsi = rsi(&closes, RSI_LENGTH)?;
    let macd = macd(
        &closes,
        settings.macd_fast_len,
        settings.macd_slow_len,
        settings.macd_signal_len,
    )?;

    let rows = series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            open_time: bar.open_time,
            close: closes[i],
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            rsi: rsi[i],
            macd: macd.macd[i],
            macd_signal: macd.signal[i],
            macd_histogram: macd.histogram[i],
        })
        .collect();

    Ok(rows)
}

/// The snapshot of the most recent row with no undefined cell.
pub fn last_usable(rows: &[IndicatorRow]) -> Option<IndicatorSnapshot> {
    rows.iter().rev().find_map(IndicatorRow::snapshot)
}

/// Exponential moving average seeded with the simple mean of the first `length` values.
pub fn ema(values: &[f64], length: usize) -> Result<Vec<Option<f64>>> {
    check_length("ema", length)?;

    let mut out = vec![None; values.len()];
    if values.len() < length {
        return Ok(out);
    }

    let mut seed = Sma::new(length).map_err(|_| Error::InvalidLength { name: "ema", length })?;
    let mut current = 0.0;
    for value in &values[..length] {
        current = seed.next(*value);
    }
    out[length - 1] = Some(current);

    let alpha = 2.0 / (length as f64 + 1.0);
    for (i, value) in values.iter().enumerate().skip(length) {
        current = alpha * value + (1.0 - alpha) * current;
        out[i] = Some(current);
    }

    Ok(out)
}

/// Relative strength index with Wilder's smoothing of average gains and losses.
pub fn rsi(values: &[f64], length: usize) -> Result<Vec<Option<f64>>> {
    check_length("rsi", length)?;

    let mut out = vec![None; values.len()];
    let window = length as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (offset, pair) in values.windows(2).enumerate() {
        let i = offset + 1;
        let change = pair[1] - pair[0];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        if i < length {
            avg_gain += gain;
            avg_loss += loss;
            continue;
        }

        if i == length {
            avg_gain = (avg_gain + gain) / window;
            avg_loss = (avg_loss + loss) / window;
        } else {
            avg_gain = (avg_gain * (window - 1.0) + gain) / window;
            avg_loss = (avg_loss * (window - 1.0) + loss) / window;
        }

        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    Ok(out)
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // Flat window: no momentum either way.
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// MACD main line, its signal line and their histogram.
///
/// The signal EMA only starts once the main line is defined, so the signal and
/// histogram appear `signal - 1` bars after the main line.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Result<MacdLines> {
    check_length("macd_signal", signal)?;
    let fast_line = ema(values, fast)?;
    let slow_line = ema(values, slow)?;

    let macd: Vec<Option<f64>> = fast_line
        .iter()
        .zip(&slow_line)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let mut signal_line = vec![None; values.len()];
    if let Some(start) = macd.iter().position(Option::is_some) {
        // Both EMAs stay defined once they start, so the tail is contiguous.
        let tail: Vec<f64> = macd[start..].iter().flatten().copied().collect();
        for (k, value) in ema(&tail, signal)?.into_iter().enumerate() {
            signal_line[start + k] = value;
        }
    }

    let histogram = macd
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Ok(MacdLines {
        macd,
        signal: signal_line,
        histogram,
    })
}

fn check_length(name: &'static str, length: usize) -> Result<()> {
    if length == 0 {
        return Err(Error::InvalidLength { name, length });
    }
    Ok(())
}

fn closes(series: &PriceSeries) -> Result<Vec<f64>> {
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(index, bar)| match bar.close.to_f64() {
            Some(close) if close.is_finite() && close > 0.0 => Ok(close),
            _ => Err(Error::InvalidPrice {
                index,
                value: bar.close.to_string(),
            }),
        })
        .collect()
}
