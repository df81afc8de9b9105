// =============================================================================
// Binance REST API Client — public market-data endpoints
// =============================================================================
//
// Only unsigned endpoints are used: the engine never places orders, so no
// API key or secret is configured.
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::market_data::weight::WeightTracker;
use crate::market_data::MarketSnapshot;

/// Binance spot REST client.
#[derive(Clone)]
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
    weight: Arc<WeightTracker>,
}

impl BinanceClient {
    /// Create a new client against `base_url` (normally
    /// `https://api.binance.com`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "BinanceClient initialised");

        Ok(Self {
            base_url,
            client,
            weight: Arc::new(WeightTracker::new()),
        })
    }

    async fn get_json(&self, path_and_query: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {path_and_query} request failed"))?;

        self.weight.update_from_headers(resp.headers());

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {path_and_query} response"))?;

        if !status.is_success() {
            anyhow::bail!("Binance GET {} returned {}: {}", path_and_query, status, body);
        }

        Ok(body)
    }

    // -------------------------------------------------------------------------
    // Public market data
    // -------------------------------------------------------------------------

    /// GET /api/v3/ticker/24hr
    #[instrument(skip(self), name = "binance::get_ticker_24hr")]
    pub async fn get_ticker_24hr(&self, symbol: &str) -> Result<MarketSnapshot> {
        let body = self
            .get_json(&format!("/api/v3/ticker/24hr?symbol={symbol}"))
            .await?;
        let snapshot = parse_ticker(&body)?;
        debug!(symbol, price = snapshot.price, change = snapshot.change_24h_pct, "ticker fetched");
        Ok(snapshot)
    }

    /// GET /api/v3/klines: closing prices only, oldest first.
    ///
    /// The last element is the still-forming candle, so it tracks the live
    /// price.
    #[instrument(skip(self), name = "binance::get_closes")]
    pub async fn get_closes(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<f64>> {
        let body = self
            .get_json(&format!(
                "/api/v3/klines?symbol={symbol}&interval={interval}&limit={limit}"
            ))
            .await?;
        let closes = parse_closes(&body)?;
        debug!(symbol, interval, count = closes.len(), "klines fetched");
        Ok(closes)
    }
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("weight", &self.weight)
            .finish()
    }
}

// =============================================================================
// Response parsing
// =============================================================================

/// Parse a 24hr ticker body. Binance encodes decimals as strings.
pub fn parse_ticker(body: &serde_json::Value) -> Result<MarketSnapshot> {
    let field = |name: &str| -> Result<f64> {
        parse_str_f64(&body[name]).with_context(|| format!("ticker field '{name}'"))
    };

    Ok(MarketSnapshot {
        price: field("lastPrice")?,
        change_24h_pct: field("priceChangePercent")?,
        high: field("highPrice")?,
        low: field("lowPrice")?,
        volume: field("quoteVolume")?,
    })
}

/// Extract closes from Binance's array-of-arrays kline format.
///
/// Array indices:
///   [0] openTime, [1] open, [2] high, [3] low, [4] close, [5] volume, ...
///
/// A truncated entry fails the whole series so the indicators never run on
/// a silently shortened window.
pub fn parse_closes(body: &serde_json::Value) -> Result<Vec<f64>> {
    let raw = body.as_array().context("klines response is not an array")?;

    let mut closes = Vec::with_capacity(raw.len());
    for (i, entry) in raw.iter().enumerate() {
        let arr = entry.as_array().with_context(|| format!("kline entry {i} is not an array"))?;
        if arr.len() < 5 {
            anyhow::bail!("kline entry {i} has {} elements, expected at least 5", arr.len());
        }
        closes.push(parse_str_f64(&arr[4]).with_context(|| format!("kline entry {i} close"))?);
    }
    Ok(closes)
}

/// Parse a JSON value that may be either a string or a number into `f64`.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        anyhow::bail!("expected string or number, got: {val}")
    }
}
