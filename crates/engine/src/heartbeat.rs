// In crates/engine/src/heartbeat.rs

use app_config::types::HeartbeatSettings;
use core_types::Symbol;
use strategies::IndicatorSnapshot;

/// Whether cycle `cycle_index` (1-based) should send a heartbeat.
pub fn is_due(settings: &HeartbeatSettings, cycle_index: u64) -> bool {
    settings.enabled && settings.every_cycles > 0 && cycle_index % settings.every_cycles == 0
}

/// `"{prefix} {symbol}: no short signal (cycle N)"`, with the latest close when known.
pub fn message(
    settings: &HeartbeatSettings,
    symbol: &Symbol,
    cycle_index: u64,
    snapshot: Option<&IndicatorSnapshot>,
) -> String {
    let base = format!(
        "{} {}: no short signal (cycle {})",
        settings.prefix, symbol, cycle_index
    );
    match snapshot {
        Some(snapshot) => format!(
            "{base}, price {:.2} {}",
            snapshot.close,
            symbol.quote_currency().to_uppercase()
        ),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(enabled: bool, every_cycles: u64) -> HeartbeatSettings {
        HeartbeatSettings {
            enabled,
            every_cycles,
            prefix: "💤".into(),
        }
    }

    #[test]
    fn due_on_multiples_only() {
        let settings = settings(true, 3);
        let due: Vec<u64> = (1..=9).filter(|i| is_due(&settings, *i)).collect();
        assert_eq!(due, vec![3, 6, 9]);
    }

    #[test]
    fn every_cycle_when_cadence_is_one() {
        let settings = settings(true, 1);
        assert!((1..=5).all(|i| is_due(&settings, i)));
    }

    #[test]
    fn disabled_is_never_due() {
        let settings = settings(false, 3);
        assert!(!(1..=12).any(|i| is_due(&settings, i)));
    }

    #[test]
    fn message_with_price() {
        let snapshot = IndicatorSnapshot {
            close: 18645.0,
            ema_fast: 18707.2,
            ema_slow: 18754.5,
            rsi: 76.5,
            macd: -24.6,
            macd_signal: -17.3,
            macd_histogram: -7.2,
        };
        let text = message(&settings(true, 3), &Symbol("btc_mxn".into()), 6, Some(&snapshot));
        assert_eq!(text, "💤 btc_mxn: no short signal (cycle 6), price 18645.00 MXN");
    }

    #[test]
    fn message_without_snapshot_has_no_price() {
        let text = message(&settings(true, 3), &Symbol("btc_mxn".into()), 3, None);
        assert_eq!(text, "💤 btc_mxn: no short signal (cycle 3)");
    }
}
