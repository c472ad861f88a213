// In crates/engine/tests/orchestrator.rs

use api_client::MarketData;
use app_config::Settings;
use async_trait::async_trait;
use core_types::{Kline, PriceSeries, SignalType, Symbol, TradeLogEntry};
use database::TradeStore;
use engine::{CycleError, CycleOutcome, CycleStage, Engine};
use notifier::Notifier;
use risk::{PositionSizer, SizingSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strategies::{ShortReversal, ShortReversalSettings};

// --- Fixtures ---

/// Spike, slow decline, long flat stretch, then a late sell-off: the last bar is
/// an overbought bounce inside a downtrend.
fn spike_then_decline() -> Vec<i64> {
    [
        (10_000, 1),
        (19_400, 16),
        (19_000, 1),
        (18_800, 4),
        (18_780, 1),
        (18_760, 3),
        (18_730, 28),
        (18_720, 1),
        (18_710, 1),
        (18_700, 1),
        (18_650, 1),
        (18_645, 2),
    ]
    .iter()
    .flat_map(|(close, count)| std::iter::repeat_n(*close, *count))
    .collect()
}

/// A steady climb: closes stay above both EMAs, so the rule never fires.
fn steady_climb() -> Vec<i64> {
    (100..160).collect()
}

fn series_from(closes: &[i64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let close = Decimal::from(*close);
            Kline {
                open_time: 1_700_000_000_000 + i as i64 * 300_000,
                open: close,
                high: close,
                low: close,
                close,
                volume: Decimal::ONE,
            }
        })
        .collect();
    PriceSeries::from_bars(bars, 200)
}

// --- Fakes ---

struct FakeMarket {
    series: PriceSeries,
    price: Decimal,
    balances: HashMap<String, Decimal>,
    failing_fetches: AtomicUsize,
    fetch_calls: Arc<AtomicUsize>,
}

#[async_trait]
impl MarketData for FakeMarket {
    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn fetch_recent_bars(
        &self,
        _symbol: &Symbol,
        _interval_secs: u32,
        _limit: usize,
    ) -> api_client::Result<PriceSeries> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_fetches.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_fetches.store(remaining - 1, Ordering::SeqCst);
            return Err(api_client::Error::ApiError {
                code: "0201".into(),
                msg: "exchange unavailable".into(),
            });
        }
        Ok(self.series.clone())
    }

    async fn fetch_last_price(&self, _symbol: &Symbol) -> api_client::Result<Decimal> {
        Ok(self.price)
    }

    async fn fetch_balance(&self) -> api_client::Result<HashMap<String, Decimal>> {
        Ok(self.balances.clone())
    }
}

#[derive(Clone, Default)]
struct FakeStore {
    entries: Arc<Mutex<Vec<TradeLogEntry>>>,
    fail: bool,
}

#[async_trait]
impl TradeStore for FakeStore {
    async fn append_trade_log(&self, entry: &TradeLogEntry) -> database::Result<()> {
        if self.fail {
            return Err(database::Error::Conversion("disk full".into()));
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

#[async_trait]
impl Notifier for FakeNotifier {
    fn name(&self) -> &'static str {
        "Fake"
    }

    async fn send(&self, message: &str) -> notifier::Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.fail {
            return Err(notifier::Error::Rejected {
                status: 403,
                body: "bot was blocked by the user".into(),
            });
        }
        Ok(())
    }
}

struct Harness {
    engine: Engine,
    store: FakeStore,
    notifier: FakeNotifier,
    fetch_calls: Arc<AtomicUsize>,
}

struct Setup {
    closes: Vec<i64>,
    price: Decimal,
    balances: HashMap<String, Decimal>,
    failing_fetches: usize,
    every_cycles: u64,
    store: FakeStore,
    notifier: FakeNotifier,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            closes: spike_then_decline(),
            price: dec!(500000),
            balances: HashMap::from([("mxn".to_string(), dec!(10000))]),
            failing_fetches: 0,
            every_cycles: 12,
            store: FakeStore::default(),
            notifier: FakeNotifier::default(),
        }
    }
}

fn harness(setup: Setup) -> Harness {
    let mut settings = Settings::default();
    settings.heartbeat.every_cycles = setup.every_cycles;

    let fetch_calls = Arc::new(AtomicUsize::new(0));
    let market = FakeMarket {
        series: series_from(&setup.closes),
        price: setup.price,
        balances: setup.balances,
        failing_fetches: AtomicUsize::new(setup.failing_fetches),
        fetch_calls: fetch_calls.clone(),
    };
    let strategy = ShortReversal::new(ShortReversalSettings::default()).unwrap();
    let sizer = PositionSizer::new(&SizingSettings::default()).unwrap();

    let engine = Engine::new(
        settings,
        Box::new(market),
        Box::new(strategy),
        sizer,
        Box::new(setup.store.clone()),
        Box::new(setup.notifier.clone()),
    );

    Harness {
        engine,
        store: setup.store,
        notifier: setup.notifier,
        fetch_calls,
    }
}

impl Harness {
    fn entries(&self) -> Vec<TradeLogEntry> {
        self.store.entries.lock().unwrap().clone()
    }

    fn messages(&self) -> Vec<String> {
        self.notifier.messages.lock().unwrap().clone()
    }
}

// --- Signal path ---

#[tokio::test]
async fn triggered_cycle_persists_once_and_notifies_once() {
    let h = harness(Setup {
        // A heartbeat would be due on every cycle; the signal path must not send one.
        every_cycles: 1,
        ..Setup::default()
    });

    let outcome = h.engine.run_once().await.unwrap();

    let (entry, persisted, notified) = match outcome {
        CycleOutcome::Signal {
            entry,
            persisted,
            notified,
        } => (entry, persisted, notified),
        other => panic!("expected a signal, got {other:?}"),
    };
    assert!(persisted && notified);
    assert_eq!(entry.symbol, Symbol("btc_mxn".into()));
    assert_eq!(entry.price, dec!(500000));
    assert_eq!(entry.amount, dec!(0.0006));
    assert_eq!(entry.signal_type, SignalType::Short);

    assert_eq!(h.entries(), vec![entry]);
    assert_eq!(
        h.messages(),
        vec!["💥 SHORT signal for btc_mxn\n💰 Price: 500000 MXN\n📉 Estimated amount: 0.0006".to_string()]
    );
}

#[tokio::test]
async fn missing_quote_balance_sizes_from_zero() {
    let h = harness(Setup {
        balances: HashMap::from([("btc".to_string(), dec!(1))]),
        ..Setup::default()
    });

    let outcome = h.engine.run_cycle(1).await.unwrap();

    match outcome {
        CycleOutcome::Signal { entry, .. } => assert_eq!(entry.amount, Decimal::ZERO),
        other => panic!("expected a signal, got {other:?}"),
    }
    assert_eq!(h.entries().len(), 1);
}

#[tokio::test]
async fn persistence_failure_still_notifies() {
    let h = harness(Setup {
        store: FakeStore {
            fail: true,
            ..FakeStore::default()
        },
        ..Setup::default()
    });

    let outcome = h.engine.run_cycle(1).await.unwrap();

    assert!(matches!(
        outcome,
        CycleOutcome::Signal {
            persisted: false,
            notified: true,
            ..
        }
    ));
    assert_eq!(h.messages().len(), 1);
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_cycle() {
    let h = harness(Setup {
        notifier: FakeNotifier {
            fail: true,
            ..FakeNotifier::default()
        },
        ..Setup::default()
    });

    let outcome = h.engine.run_cycle(1).await.unwrap();

    assert!(matches!(
        outcome,
        CycleOutcome::Signal {
            persisted: true,
            notified: false,
            ..
        }
    ));
    assert_eq!(h.entries().len(), 1);
}

#[tokio::test]
async fn unusable_price_fails_in_the_acting_stage() {
    let h = harness(Setup {
        price: Decimal::ZERO,
        ..Setup::default()
    });

    let err = h.engine.run_cycle(1).await.unwrap_err();

    assert!(matches!(err, CycleError::Sizing(_)));
    assert_eq!(err.stage(), CycleStage::Acting);
    assert!(h.entries().is_empty());
    assert!(h.messages().is_empty());
}

// --- Idle path ---

#[tokio::test]
async fn heartbeat_goes_out_on_every_third_cycle() {
    let h = harness(Setup {
        closes: steady_climb(),
        every_cycles: 3,
        ..Setup::default()
    });

    for cycle_index in 1..=9 {
        let outcome = h.engine.run_cycle(cycle_index).await.unwrap();
        let due = cycle_index % 3 == 0;
        assert_eq!(
            outcome,
            CycleOutcome::NoSignal {
                heartbeat_due: due,
                notified: due,
            },
            "cycle {cycle_index}"
        );
    }

    assert!(h.entries().is_empty());
    assert_eq!(
        h.messages(),
        vec![
            "💤 btc_mxn: no short signal (cycle 3), price 159.00 MXN".to_string(),
            "💤 btc_mxn: no short signal (cycle 6), price 159.00 MXN".to_string(),
            "💤 btc_mxn: no short signal (cycle 9), price 159.00 MXN".to_string(),
        ]
    );
}

#[tokio::test]
async fn short_history_heartbeat_has_no_price() {
    let h = harness(Setup {
        closes: steady_climb()[..10].to_vec(),
        every_cycles: 3,
        ..Setup::default()
    });

    let outcome = h.engine.run_cycle(3).await.unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::NoSignal {
            heartbeat_due: true,
            notified: true,
        }
    );
    assert_eq!(h.messages(), vec!["💤 btc_mxn: no short signal (cycle 3)".to_string()]);
}

#[tokio::test]
async fn single_shot_runs_cycle_one() {
    let h = harness(Setup {
        closes: steady_climb(),
        every_cycles: 1,
        ..Setup::default()
    });

    h.engine.run_once().await.unwrap();

    assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.messages(),
        vec!["💤 btc_mxn: no short signal (cycle 1), price 159.00 MXN".to_string()]
    );
}

// --- Failures and the loop ---

#[tokio::test]
async fn fetch_failure_ends_the_cycle_in_the_fetching_stage() {
    let h = harness(Setup {
        failing_fetches: 1,
        ..Setup::default()
    });

    let err = h.engine.run_once().await.unwrap_err();

    assert_eq!(err.stage(), CycleStage::Fetching);
    assert!(h.entries().is_empty());
    assert!(h.messages().is_empty());
}

#[tokio::test(start_paused = true)]
async fn loop_survives_a_failed_fetch_and_keeps_counting() {
    let h = harness(Setup {
        closes: steady_climb(),
        failing_fetches: 1,
        every_cycles: 3,
        ..Setup::default()
    });

    // Cycles start at t = 0, 300 and 600; shutdown lands in the third sleep.
    let shutdown = tokio::time::sleep(Duration::from_secs(750));
    let state = h.engine.run_until(shutdown).await;

    assert_eq!(state.cycle_index, 3);
    assert_eq!(state.failed_cycles, 1);
    assert!(state.last_run.is_some());
    assert_eq!(h.fetch_calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        h.messages(),
        vec!["💤 btc_mxn: no short signal (cycle 3), price 159.00 MXN".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn loop_keeps_the_interval_between_cycle_starts() {
    let h = harness(Setup {
        closes: steady_climb(),
        ..Setup::default()
    });

    let started = tokio::time::Instant::now();
    let shutdown = tokio::time::sleep(Duration::from_secs(300 * 4 + 1));
    let state = h.engine.run_until(shutdown).await;

    assert_eq!(state.cycle_index, 5);
    assert_eq!(state.failed_cycles, 0);
    assert!(started.elapsed() >= Duration::from_secs(1201));
}
