// In crates/api-client/src/bitso.rs

use crate::types::{BalancePayload, Envelope, OhlcBucket, Ticker};
use crate::{Error, MarketData, Result};
use app_config::types::BitsoSettings;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{Kline, PriceSeries, Symbol};
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::collections::HashMap;
use std::time::Duration;

// Create a type alias for the HMAC-SHA256 implementation.
type HmacSha256 = Hmac<Sha256>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const BALANCE_PATH: &str = "/api/v3/balance/";

/// REST client for the Bitso v3 public and private API.
#[derive(Debug, Clone)]
pub struct BitsoClient {
    /// The persistent HTTP client.
    http_client: Client,
    api_key: String,
    secret_key: String,
    /// e.g. `https://api.bitso.com`, without a trailing slash.
    base_url: String,
}

impl BitsoClient {
    /// Constructs a new `BitsoClient` from `BitsoSettings`.
    pub fn new(settings: &BitsoSettings) -> Result<Self> {
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key: settings.api_key.clone(),
            secret_key: settings.secret_key.clone(),
            base_url: settings.rest_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the `Authorization` header value for a private request.
    ///
    /// The signed message is `nonce + method + path (+ body)`.
    fn authorization(&self, nonce: i64, method: &str, path: &str) -> Result<String> {
        if self.api_key.is_empty() || self.secret_key.is_empty() {
            return Err(Error::InvalidCredentials(
                "bitso.api_key and bitso.secret_key are required for private endpoints".into(),
            ));
        }
        let message = format!("{nonce}{method}{path}");
        let signature = sign(&self.secret_key, &message)?;
        Ok(format!("Bitso {}:{}:{}", self.api_key, nonce, signature))
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let body = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await?
            .text()
            .await?;
        parse_envelope(&body)
    }
}

#[async_trait]
impl MarketData for BitsoClient {
    fn name(&self) -> &'static str {
        "Bitso"
    }

    async fn fetch_recent_bars(
        &self,
        symbol: &Symbol,
        interval_secs: u32,
        limit: usize,
    ) -> Result<PriceSeries> {
        let end = Utc::now().timestamp_millis();
        let span = i64::from(interval_secs) * 1_000 * limit as i64;
        let start = end - span;

        let query = [
            ("book", symbol.0.to_lowercase()),
            ("time_bucket", interval_secs.to_string()),
            ("start", start.to_string()),
            ("end", end.to_string()),
        ];
        let buckets: Vec<OhlcBucket> = self.get_public("/api/v3/ohlc", &query).await?;

        tracing::debug!(symbol = %symbol, buckets = buckets.len(), "Fetched OHLC buckets.");
        let bars = buckets.into_iter().map(Kline::from).collect();
        Ok(PriceSeries::from_bars(bars, limit))
    }

    async fn fetch_last_price(&self, symbol: &Symbol) -> Result<Decimal> {
        let query = [("book", symbol.0.to_lowercase())];
        let ticker: Ticker = self.get_public("/api/v3/ticker", &query).await?;
        Ok(ticker.last)
    }

    async fn fetch_balance(&self) -> Result<HashMap<String, Decimal>> {
        let nonce = Utc::now().timestamp_millis();
        let authorization = self.authorization(nonce, "GET", BALANCE_PATH)?;

        let url = format!("{}{}", self.base_url, BALANCE_PATH);
        let body = self
            .http_client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .send()
            .await?
            .text()
            .await?;

        let payload: BalancePayload = parse_envelope(&body)?;
        Ok(balances_by_currency(payload))
    }
}

/// Hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn sign(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::InvalidCredentials(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Unwraps the `{success, payload | error}` envelope.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> Result<T> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;

    if !envelope.success {
        let error = envelope.error.unwrap_or_default();
        return Err(Error::ApiError {
            code: error.code,
            msg: error.message,
        });
    }

    envelope.payload.ok_or_else(|| {
        Error::DeserializationFailed(<serde_json::Error as serde::de::Error>::custom(
            "successful response without a payload",
        ))
    })
}

fn balances_by_currency(payload: BalancePayload) -> HashMap<String, Decimal> {
    payload
        .balances
        .into_iter()
        .map(|balance| (balance.currency.to_lowercase(), balance.available))
        .collect()
}
