// In crates/engine/src/lib.rs

pub mod cycle;
pub mod error;
pub mod heartbeat;
pub mod schedule;

use api_client::MarketData;
use app_config::Settings;
use core_types::Symbol;
use database::TradeStore;
use notifier::Notifier;
use risk::PositionSizer;
use std::future::Future;
use strategies::Strategy;
use tokio::time::Instant;

pub use cycle::CycleOutcome;
pub use error::{CycleError, CycleStage};
pub use schedule::CycleState;

/// The single-symbol signal orchestrator.
///
/// Owns one collaborator per concern and drives them one cycle at a time.
pub struct Engine {
    symbol: Symbol,
    settings: Settings,
    market: Box<dyn MarketData + Send + Sync>,
    strategy: Box<dyn Strategy + Send + Sync>,
    sizer: PositionSizer,
    store: Box<dyn TradeStore + Send + Sync>,
    notifier: Box<dyn Notifier + Send + Sync>,
}

impl Engine {
    pub fn new(
        settings: Settings,
        market: Box<dyn MarketData + Send + Sync>,
        strategy: Box<dyn Strategy + Send + Sync>,
        sizer: PositionSizer,
        store: Box<dyn TradeStore + Send + Sync>,
        notifier: Box<dyn Notifier + Send + Sync>,
    ) -> Self {
        Self {
            symbol: Symbol(settings.trading.symbol.clone()),
            settings,
            market,
            strategy,
            sizer,
            store,
            notifier,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Single-shot mode: exactly one cycle, with index 1.
    pub async fn run_once(&self) -> Result<CycleOutcome, CycleError> {
        tracing::info!(symbol = %self.symbol, strategy = self.strategy.name(), "Running a single cycle.");
        let outcome = self.run_cycle(1).await;
        if let Err(e) = &outcome {
            tracing::error!(cycle = 1, stage = %e.stage(), error = %e, "Cycle failed.");
        }
        outcome
    }

    /// Continuous mode: runs cycles until `shutdown` resolves.
    ///
    /// Shutdown is only observed while sleeping between cycles, so a running
    /// cycle always completes.
    pub async fn run_until<F>(&self, shutdown: F) -> CycleState
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            symbol = %self.symbol,
            strategy = self.strategy.name(),
            interval_secs = self.settings.schedule.interval_seconds,
            "Starting signal loop."
        );

        tokio::pin!(shutdown);
        let mut state = CycleState::default();

        loop {
            let cycle_index = state.advance();
            let started = Instant::now();

            match self.run_cycle(cycle_index).await {
                Ok(outcome) => tracing::debug!(cycle = cycle_index, ?outcome, "Cycle complete."),
                Err(e) => {
                    state.failed_cycles += 1;
                    tracing::error!(cycle = cycle_index, stage = %e.stage(), error = %e, "Cycle failed.");
                }
            }

            let pause = schedule::sleep_duration(self.settings.schedule.interval_seconds, started.elapsed());
            tokio::select! {
                _ = tokio::time::sleep(pause) => {}
                _ = &mut shutdown => {
                    tracing::info!(cycles = state.cycle_index, "Shutdown requested, stopping signal loop.");
                    break;
                }
            }
        }

        state
    }
}
