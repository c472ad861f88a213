// In crates/app-config/src/types.rs

use serde::Deserialize;

use risk::types::SizingSettings;
use strategies::types::ShortReversalSettings;

/// Bar sizes, in seconds, that Bitso serves OHLC buckets for.
pub const SUPPORTED_BAR_INTERVALS: [u32; 8] = [60, 300, 900, 1800, 3600, 14400, 86400, 604800];

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    /// Settings for the Bitso API.
    pub bitso: BitsoSettings,
    /// Chat delivery; messages only go to the log when absent.
    pub telegram: Option<TelegramSettings>,
    /// Settings for the trade-log database.
    pub database: DatabaseSettings,
    pub trading: TradingSettings,
    pub sizing: SizingSettings,
    pub strategy: ShortReversalSettings,
    pub schedule: ScheduleSettings,
    pub heartbeat: HeartbeatSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppSettings {
    /// Default log level: trace, debug, info, warn or error.
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BitsoSettings {
    /// The API key for Bitso. Only the balance endpoint needs it.
    pub api_key: String,
    /// The secret key for Bitso.
    pub secret_key: String,
    /// The REST API base URL for Bitso.
    pub rest_base_url: String,
}

impl Default for BitsoSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            rest_base_url: "https://api.bitso.com".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".into()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatabaseSettings {
    /// The connection URL for the SQLite trade log.
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://trades.db".into(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TradingSettings {
    /// Order book in `base_quote` form, e.g. `btc_mxn`.
    pub symbol: String,
    /// Bar size in seconds.
    pub bar_interval_secs: u32,
    /// How many of the most recent bars each cycle fetches.
    pub bar_limit: usize,
}

impl Default for TradingSettings {
    fn default() -> Self {
        Self {
            symbol: "btc_mxn".into(),
            bar_interval_secs: 300,
            bar_limit: 200,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Target period between cycle starts.
    pub interval_seconds: u64,
    /// Run a single cycle and exit.
    pub run_once: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            run_once: false,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HeartbeatSettings {
    pub enabled: bool,
    /// A heartbeat goes out on every cycle index divisible by this.
    pub every_cycles: u64,
    pub prefix: String,
}

impl Default for HeartbeatSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            every_cycles: 12,
            prefix: "💤".into(),
        }
    }
}
