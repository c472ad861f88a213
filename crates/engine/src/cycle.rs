// In crates/engine/src/cycle.rs

use crate::Engine;
use crate::error::CycleError;
use crate::heartbeat;
use chrono::Utc;
use core_types::{SignalType, Symbol, TradeLogEntry};
use rust_decimal::Decimal;
use strategies::IndicatorSnapshot;

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// The rule fired: a simulated trade was sized and reported.
    Signal {
        entry: TradeLogEntry,
        persisted: bool,
        notified: bool,
    },
    /// The rule did not fire; a heartbeat may have gone out.
    NoSignal {
        heartbeat_due: bool,
        notified: bool,
    },
}

impl Engine {
    /// Runs one fetch, compute, decide and act pass.
    ///
    /// Fetch, computation and sizing failures end the cycle and are returned.
    /// Persistence and notification failures are logged and the cycle completes.
    pub async fn run_cycle(&self, cycle_index: u64) -> Result<CycleOutcome, CycleError> {
        tracing::debug!(cycle = cycle_index, symbol = %self.symbol, "Starting cycle.");

        // --- 1. Fetch ---
        let trading = &self.settings.trading;
        let series = self
            .market
            .fetch_recent_bars(&self.symbol, trading.bar_interval_secs, trading.bar_limit)
            .await
            .map_err(CycleError::Fetch)?;

        // --- 2. Compute & evaluate ---
        let result = self.strategy.assess(&series).map_err(CycleError::Compute)?;

        // --- 3. Report the snapshot ---
        match &result.snapshot {
            Some(snapshot) => log_snapshot(cycle_index, &self.symbol, snapshot),
            None => tracing::info!(
                cycle = cycle_index,
                bars = series.len(),
                needed = self.strategy.longest_lookback(),
                "Not enough history for a usable snapshot."
            ),
        }

        // --- 4. Act or idle ---
        if result.triggered {
            self.act(cycle_index).await
        } else {
            tracing::info!(cycle = cycle_index, symbol = %self.symbol, "No short signal.");
            Ok(self.idle(cycle_index, result.snapshot.as_ref()).await)
        }
    }

    async fn act(&self, cycle_index: u64) -> Result<CycleOutcome, CycleError> {
        let balances = self
            .market
            .fetch_balance()
            .await
            .map_err(CycleError::Account)?;
        let price = self
            .market
            .fetch_last_price(&self.symbol)
            .await
            .map_err(CycleError::Account)?;

        let quote = self.symbol.quote_currency().to_lowercase();
        let balance = match balances.get(&quote) {
            Some(balance) => *balance,
            None => {
                tracing::warn!(currency = %quote, "No balance for the quote currency, sizing from zero.");
                Decimal::ZERO
            }
        };

        let amount = self
            .sizer
            .order_size(balance, price)
            .map_err(CycleError::Sizing)?;

        let entry = TradeLogEntry {
            timestamp: Utc::now(),
            symbol: self.symbol.clone(),
            price,
            amount,
            signal_type: SignalType::Short,
        };
        tracing::info!(
            cycle = cycle_index,
            symbol = %self.symbol,
            %price,
            %balance,
            %amount,
            "Short signal triggered."
        );

        let persisted = match self.store.append_trade_log(&entry).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist the trade log entry.");
                false
            }
        };

        let notified = self.notify(&trade_message(&entry)).await;

        Ok(CycleOutcome::Signal {
            entry,
            persisted,
            notified,
        })
    }

    async fn idle(&self, cycle_index: u64, snapshot: Option<&IndicatorSnapshot>) -> CycleOutcome {
        let heartbeat_due = heartbeat::is_due(&self.settings.heartbeat, cycle_index);
        let notified = if heartbeat_due {
            let text = heartbeat::message(&self.settings.heartbeat, &self.symbol, cycle_index, snapshot);
            self.notify(&text).await
        } else {
            false
        };

        CycleOutcome::NoSignal {
            heartbeat_due,
            notified,
        }
    }

    /// Best-effort delivery; a failure is only worth a warning.
    async fn notify(&self, message: &str) -> bool {
        match self.notifier.send(message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(channel = self.notifier.name(), error = %e, "Failed to send notification.");
                false
            }
        }
    }
}

fn log_snapshot(cycle_index: u64, symbol: &Symbol, snapshot: &IndicatorSnapshot) {
    tracing::info!(
        cycle = cycle_index,
        symbol = %symbol,
        close = snapshot.close,
        ema_fast = snapshot.ema_fast,
        ema_slow = snapshot.ema_slow,
        rsi = snapshot.rsi,
        macd = snapshot.macd,
        macd_signal = snapshot.macd_signal,
        macd_histogram = snapshot.macd_histogram,
        "Indicator snapshot."
    );
}

/// The chat message for a triggered signal.
pub fn trade_message(entry: &TradeLogEntry) -> String {
    format!(
        "💥 SHORT signal for {}\n💰 Price: {} {}\n📉 Estimated amount: {}",
        entry.symbol,
        entry.price,
        entry.symbol.quote_currency().to_uppercase(),
        entry.amount
    )
}
