// In crates/api-client/src/types.rs

use core_types::Kline;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Every Bitso v3 response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub payload: Option<T>,
    pub error: Option<ErrorBody>,
}

/// The `error` object of a failed response.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// A single OHLC bucket from `GET /api/v3/ohlc`.
///
/// Rates and volume arrive as decimal strings.
#[derive(Debug, Deserialize, Clone)]
pub struct OhlcBucket {
    /// Bucket open time in milliseconds since the epoch.
    pub bucket_start_time: i64,
    pub first_rate: Decimal,
    pub max_rate: Decimal,
    pub min_rate: Decimal,
    pub last_rate: Decimal,
    pub volume: Decimal,
}

impl From<OhlcBucket> for Kline {
    fn from(bucket: OhlcBucket) -> Self {
        Kline {
            open_time: bucket.bucket_start_time,
            open: bucket.first_rate,
            high: bucket.max_rate,
            low: bucket.min_rate,
            close: bucket.last_rate,
            volume: bucket.volume,
        }
    }
}

/// The subset of `GET /api/v3/ticker` we read.
#[derive(Debug, Deserialize, Clone)]
pub struct Ticker {
    pub book: String,
    /// Last traded price.
    pub last: Decimal,
}

/// Payload of the signed `GET /api/v3/balance/` endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct BalancePayload {
    pub balances: Vec<CurrencyBalance>,
}

/// One currency row of the account balance.
#[derive(Debug, Deserialize, Clone)]
pub struct CurrencyBalance {
    /// Currency code, e.g. `mxn`.
    pub currency: String,
    /// Funds free for new orders.
    pub available: Decimal,
    pub locked: Decimal,
    pub total: Decimal,
}
