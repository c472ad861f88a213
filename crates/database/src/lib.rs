// In crates/database/src/lib.rs

use app_config::types::DatabaseSettings;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use core_types::{SignalType, Symbol, TradeLogEntry};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

pub mod error;

// Re-export the most important types for easy access.
pub use error::{Error, Result};

/// Timestamps are stored as UTC text, matching SQLite's `datetime('now')`.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only sink for simulated trades.
#[async_trait]
pub trait TradeStore {
    async fn append_trade_log(&self, entry: &TradeLogEntry) -> Result<()>;
}

/// A trade-log row as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub id: i64,
    pub entry: TradeLogEntry,
}

/// A wrapper around the `sqlx` connection pool.
#[derive(Debug, Clone)]
pub struct Db(SqlitePool);

/// Opens (creating if needed) the SQLite database and runs migrations.
///
/// The pool holds a single long-lived connection: writes are sequential and an
/// in-memory database lives only as long as its connection.
pub async fn connect(settings: &DatabaseSettings) -> Result<Db> {
    let options = SqliteConnectOptions::from_str(&settings.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    // Idempotent: the trade_log table is created only if absent.
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!(url = %settings.url, "Trade log database ready.");
    Ok(Db(pool))
}

impl Db {
    /// Reads the newest `limit` trade-log rows, newest first.
    pub async fn recent_trades(&self, limit: u32) -> Result<Vec<TradeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, symbol, price, amount, signal
            FROM trade_log
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        rows.iter().map(record_from_row).collect()
    }
}

#[async_trait]
impl TradeStore for Db {
    async fn append_trade_log(&self, entry: &TradeLogEntry) -> Result<()> {
        let price = to_real(entry.price)?;
        let amount = to_real(entry.amount)?;

        sqlx::query(
            r#"
            INSERT INTO trade_log (timestamp, symbol, price, amount, signal)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.timestamp.format(TIMESTAMP_FORMAT).to_string())
        .bind(&entry.symbol.0)
        .bind(price)
        .bind(amount)
        .bind(entry.signal_type.as_str())
        .execute(&self.0)
        .await
        .map_err(Error::OperationFailed)?;

        tracing::debug!(symbol = %entry.symbol, %price, %amount, "Trade log row appended.");
        Ok(())
    }
}

// --- Row conversion ---

fn to_real(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| Error::Conversion(format!("{value} does not fit a REAL column")))
}

fn from_real(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| Error::Conversion(format!("{value} is not a decimal")))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::Conversion(format!("timestamp {value:?}: {e}")))
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TradeRecord> {
    let get_err = Error::OperationFailed;

    let timestamp: String = row.try_get("timestamp").map_err(get_err)?;
    let signal: String = row.try_get("signal").map_err(get_err)?;
    let signal_type = SignalType::parse(&signal)
        .ok_or_else(|| Error::Conversion(format!("unknown signal {signal:?}")))?;

    Ok(TradeRecord {
        id: row.try_get("id").map_err(get_err)?,
        entry: TradeLogEntry {
            timestamp: parse_timestamp(&timestamp)?,
            symbol: Symbol(row.try_get("symbol").map_err(get_err)?),
            price: from_real(row.try_get("price").map_err(get_err)?)?,
            amount: from_real(row.try_get("amount").map_err(get_err)?)?,
            signal_type,
        },
    })
}
