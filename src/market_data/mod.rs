// =============================================================================
// Market Data — provider abstraction and the per-cycle input bundle
// =============================================================================
//
// A refresh cycle must observe one consistent set of inputs. `MarketInputs`
// is that set: it is gathered completely before any derivation runs, and
// the engine never reaches back into a provider mid-derivation.
//
// Degradation policy while gathering:
//   ticker         required: the cycle is aborted
//   trend series   required: the cycle is aborted
//   sentiment      falls back to 50 / "Neutral"
//   RSI series     falls back to empty (RSI unknown)
//   chart series   falls back to empty (no chart domain)
// =============================================================================

pub mod binance;
pub mod fear_greed;
pub mod weight;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::sentiment::SentimentScore;

pub use binance::BinanceClient;
pub use fear_greed::FearGreedClient;

/// 24h ticker statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price: f64,
    pub change_24h_pct: f64,
    pub high: f64,
    pub low: f64,
    /// Quote-asset volume.
    pub volume: f64,
}

/// Source of market data for a refresh cycle.
#[async_trait]
pub trait MarketFeed: Send + Sync {
    /// 24h ticker for `symbol`.
    async fn ticker(&self, symbol: &str) -> Result<MarketSnapshot>;

    /// Closing prices, oldest first.
    async fn closes(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<f64>>;

    /// Current Fear & Greed reading.
    async fn sentiment(&self) -> Result<SentimentScore>;
}

/// Everything one refresh cycle derives from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketInputs {
    pub symbol: String,
    pub market: MarketSnapshot,
    pub sentiment: SentimentScore,
    /// Long-cadence closes (moving averages, bands, volatility).
    pub trend_closes: Vec<f64>,
    /// Short-cadence closes (RSI).
    pub momentum_closes: Vec<f64>,
    /// Closes drawn on the price chart.
    pub chart_closes: Vec<f64>,
}

impl MarketInputs {
    /// Gather a complete input bundle from `feed`.
    pub async fn gather<F: MarketFeed + ?Sized>(feed: &F, config: &EngineConfig) -> Result<Self> {
        let symbol = config.symbol.as_str();

        let market = feed
            .ticker(symbol)
            .await
            .with_context(|| format!("ticker fetch failed for {symbol}"))?;

        let sentiment = match feed.sentiment().await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "sentiment fetch failed, using neutral reading");
                SentimentScore::neutral()
            }
        };

        let trend_closes = feed
            .closes(symbol, &config.ma_interval, config.ma_limit)
            .await
            .with_context(|| format!("{} klines fetch failed for {symbol}", config.ma_interval))?;

        let momentum_closes = feed
            .closes(symbol, &config.rsi_interval, config.rsi_limit)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, interval = %config.rsi_interval, "momentum series unavailable");
                Vec::new()
            });

        let chart_closes = feed
            .closes(symbol, &config.chart_interval, config.chart_limit)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, interval = %config.chart_interval, "chart series unavailable");
                Vec::new()
            });

        debug!(
            symbol,
            price = market.price,
            sentiment = sentiment.value,
            trend = trend_closes.len(),
            momentum = momentum_closes.len(),
            chart = chart_closes.len(),
            "market inputs gathered"
        );

        Ok(Self {
            symbol: symbol.to_string(),
            market,
            sentiment,
            trend_closes,
            momentum_closes,
            chart_closes,
        })
    }
}

/// Live feed backed by Binance (prices) and alternative.me (sentiment).
#[derive(Debug, Clone)]
pub struct LiveFeed {
    pub binance: BinanceClient,
    pub fear_greed: FearGreedClient,
}

impl LiveFeed {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self {
            binance: BinanceClient::new(&config.binance_base_url)?,
            fear_greed: FearGreedClient::new(&config.fear_greed_url)?,
        })
    }
}

#[async_trait]
impl MarketFeed for LiveFeed {
    async fn ticker(&self, symbol: &str) -> Result<MarketSnapshot> {
        self.binance.get_ticker_24hr(symbol).await
    }

    async fn closes(&self, symbol: &str, interval: &str, limit: u32) -> Result<Vec<f64>> {
        self.binance.get_closes(symbol, interval, limit).await
    }

    async fn sentiment(&self) -> Result<SentimentScore> {
        self.fear_greed.get_latest().await
    }
}

// =============================================================================
// Test support
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory feed; `None` entries simulate provider failures.
    pub struct StaticFeed {
        pub ticker: Option<MarketSnapshot>,
        pub sentiment: Option<SentimentScore>,
        pub series: HashMap<String, Vec<f64>>,
    }

    impl StaticFeed {
        pub fn healthy(price: f64) -> Self {
            let mut series = HashMap::new();
            series.insert("1w".to_string(), vec![price; 210]);
            series.insert("4h".to_string(), vec![price; 60]);
            Self {
                ticker: Some(MarketSnapshot {
                    price,
                    change_24h_pct: 0.5,
                    high: price * 1.01,
                    low: price * 0.99,
                    volume: 1.0e9,
                }),
                sentiment: Some(SentimentScore::new(45, "Fear")),
                series,
            }
        }
    }

    #[async_trait]
    impl MarketFeed for StaticFeed {
        async fn ticker(&self, _symbol: &str) -> Result<MarketSnapshot> {
            self.ticker.context("ticker offline")
        }

        async fn closes(&self, _symbol: &str, interval: &str, limit: u32) -> Result<Vec<f64>> {
            let series = self
                .series
                .get(interval)
                .with_context(|| format!("no {interval} series"))?;
            let start = series.len().saturating_sub(limit as usize);
            Ok(series[start..].to_vec())
        }

        async fn sentiment(&self) -> Result<SentimentScore> {
            self.sentiment.clone().context("sentiment offline")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticFeed;
    use super::*;

    #[tokio::test]
    async fn gather_healthy_feed() {
        let feed = StaticFeed::healthy(60_000.0);
        let inputs = MarketInputs::gather(&feed, &EngineConfig::default()).await.unwrap();
        assert_eq!(inputs.symbol, "BTCUSDT");
        assert_eq!(inputs.market.price, 60_000.0);
        assert_eq!(inputs.trend_closes.len(), 210);
        // RSI and chart share the 4h series but request different limits.
        assert_eq!(inputs.momentum_closes.len(), 20);
        assert_eq!(inputs.chart_closes.len(), 60);
        assert_eq!(inputs.sentiment.value, 45);
    }

    #[tokio::test]
    async fn sentiment_failure_degrades_to_neutral() {
        let mut feed = StaticFeed::healthy(60_000.0);
        feed.sentiment = None;
        let inputs = MarketInputs::gather(&feed, &EngineConfig::default()).await.unwrap();
        assert_eq!(inputs.sentiment, SentimentScore::neutral());
    }

    #[tokio::test]
    async fn short_series_failure_degrades_to_empty() {
        let mut feed = StaticFeed::healthy(60_000.0);
        feed.series.remove("4h");
        let inputs = MarketInputs::gather(&feed, &EngineConfig::default()).await.unwrap();
        assert!(inputs.momentum_closes.is_empty());
        assert!(inputs.chart_closes.is_empty());
    }

    #[tokio::test]
    async fn ticker_failure_aborts() {
        let mut feed = StaticFeed::healthy(60_000.0);
        feed.ticker = None;
        assert!(MarketInputs::gather(&feed, &EngineConfig::default()).await.is_err());
    }

    #[tokio::test]
    async fn trend_series_failure_aborts() {
        let mut feed = StaticFeed::healthy(60_000.0);
        feed.series.remove("1w");
        assert!(MarketInputs::gather(&feed, &EngineConfig::default()).await.is_err());
    }
}
