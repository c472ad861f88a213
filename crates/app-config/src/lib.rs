// In crates/app-config/src/lib.rs

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};

pub mod error;
pub mod types;

// Re-export the most important types for easy access.
pub use error::{Error, Result};
pub use types::Settings;

use types::SUPPORTED_BAR_INTERVALS;

/// Loads the application settings from various sources.
///
/// This function orchestrates the layered configuration loading:
/// 1. Reads an optional `config/base.toml` file.
/// 2. Merges settings from an environment-specific file (e.g., `config/development.toml`).
/// 3. Merges settings from environment variables.
///
/// Every key has a default, so an empty environment yields a usable `Settings`.
pub fn load_settings() -> Result<Settings> {
    // Get the current environment. Default to "development" if not set.
    let environment = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "development".into());

    // Settings from environment variables (e.g., `APP_TRADING__SYMBOL=eth_mxn`).
    // The prefix is `APP`, separator is `__`.
    let env = Environment::with_prefix("APP")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true);

    let config = layered(&environment, env).build()?;
    Settings::from_config(config)
}

fn layered(environment: &str, env: Environment) -> ConfigBuilder<DefaultState> {
    Config::builder()
        .add_source(File::with_name("config/base").required(false))
        .add_source(File::with_name(&format!("config/{environment}")).required(false))
        .add_source(env)
}

impl Settings {
    /// Deserializes a built `Config` and validates the result.
    pub fn from_config(config: Config) -> Result<Self> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects settings the cycle cannot run with.
    pub fn validate(&self) -> Result<()> {
        let strategy = &self.strategy;
        let lengths = [
            ("strategy.ema_fast_len", strategy.ema_fast_len),
            ("strategy.ema_slow_len", strategy.ema_slow_len),
            ("strategy.macd_fast_len", strategy.macd_fast_len),
            ("strategy.macd_slow_len", strategy.macd_slow_len),
            ("strategy.macd_signal_len", strategy.macd_signal_len),
            ("trading.bar_limit", self.trading.bar_limit),
        ];
        for (key, value) in lengths {
            if value == 0 {
                return Err(Error::Invalid(format!("{key} must be at least 1")));
            }
        }

        let pct = self.sizing.trade_percent;
        if !(pct > 0.0 && pct <= 1.0) {
            return Err(Error::Invalid(format!(
                "sizing.trade_percent must be within (0, 1], got {pct}"
            )));
        }
        if !(0.0..=100.0).contains(&strategy.rsi_threshold) {
            return Err(Error::Invalid(format!(
                "strategy.rsi_threshold must be within [0, 100], got {}",
                strategy.rsi_threshold
            )));
        }
        if self.heartbeat.every_cycles == 0 {
            return Err(Error::Invalid("heartbeat.every_cycles must be at least 1".into()));
        }
        if self.schedule.interval_seconds == 0 {
            return Err(Error::Invalid("schedule.interval_seconds must be at least 1".into()));
        }
        if !SUPPORTED_BAR_INTERVALS.contains(&self.trading.bar_interval_secs) {
            return Err(Error::Invalid(format!(
                "trading.bar_interval_secs must be one of {:?}, got {}",
                SUPPORTED_BAR_INTERVALS, self.trading.bar_interval_secs
            )));
        }
        match self.trading.symbol.split_once('_') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {}
            _ => {
                return Err(Error::Invalid(format!(
                    "trading.symbol must look like base_quote, got {:?}",
                    self.trading.symbol
                )));
            }
        }
        if let Some(telegram) = &self.telegram {
            if telegram.bot_token.is_empty() || telegram.chat_id.is_empty() {
                return Err(Error::Invalid(
                    "telegram.bot_token and telegram.chat_id must both be set".into(),
                ));
            }
        }

        Ok(())
    }
}
