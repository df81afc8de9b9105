// =============================================================================
// Engine Configuration — JSON settings, read once at startup
// =============================================================================
//
// Every tunable parameter of the accumulation engine lives here: which
// symbol to watch, how often to refresh, which kline cadences feed which
// indicators, and the indicator look-backs themselves.
//
// The file is read-only from the engine's point of view: environment
// overrides apply in memory and are never written back.  All fields carry
// `#[serde(default)]` so that adding new fields never breaks loading an
// older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_ma_interval() -> String {
    "1w".to_string()
}

fn default_ma_limit() -> u32 {
    210
}

fn default_rsi_interval() -> String {
    "4h".to_string()
}

fn default_rsi_limit() -> u32 {
    20
}

fn default_chart_interval() -> String {
    "4h".to_string()
}

fn default_chart_limit() -> u32 {
    60
}

fn default_capital() -> f64 {
    10_000.0
}

fn default_binance_base_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_fear_greed_url() -> String {
    "https://api.alternative.me/fng/".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_sma_short() -> usize {
    20
}

fn default_sma_medium() -> usize {
    50
}

fn default_sma_long() -> usize {
    200
}

fn default_rsi_period() -> usize {
    crate::indicators::rsi::DEFAULT_RSI_PERIOD
}

fn default_bollinger_period() -> usize {
    crate::indicators::bollinger::DEFAULT_BB_PERIOD
}

fn default_bollinger_multiplier() -> f64 {
    crate::indicators::bollinger::DEFAULT_BB_MULTIPLIER
}

fn default_volatility_period() -> usize {
    crate::indicators::volatility::DEFAULT_VOLATILITY_PERIOD
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Look-back periods for every indicator in the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Short moving average (anchors T1).
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    /// Medium moving average (anchors T2).
    #[serde(default = "default_sma_medium")]
    pub sma_medium: usize,

    /// Long moving average (anchors T3).
    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,

    /// Band width in standard deviations.
    #[serde(default = "default_bollinger_multiplier")]
    pub bollinger_multiplier: f64,

    #[serde(default = "default_volatility_period")]
    pub volatility_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: default_sma_short(),
            sma_medium: default_sma_medium(),
            sma_long: default_sma_long(),
            rsi_period: default_rsi_period(),
            bollinger_period: default_bollinger_period(),
            bollinger_multiplier: default_bollinger_multiplier(),
            volatility_period: default_volatility_period(),
        }
    }
}

// =============================================================================
// EngineConfig
// =============================================================================

/// Top-level configuration for the accumulation engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // --- Market ---------------------------------------------------------------

    /// Exchange symbol, e.g. "BTCUSDT".
    ///
    /// Zone prices are floored to whole quote units, so the ladder needs a
    /// price of roughly 5 quote units or more. Cheaper assets fail every
    /// cycle with `ZoneError::DegenerateLadder`.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Seconds between refresh cycles.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    // --- Series cadences --------------------------------------------------------

    /// Kline interval feeding the moving averages, bands and volatility.
    #[serde(default = "default_ma_interval")]
    pub ma_interval: String,

    /// Number of klines requested for the moving-average series. Must cover
    /// the long SMA for MA200 to be known.
    #[serde(default = "default_ma_limit")]
    pub ma_limit: u32,

    /// Kline interval feeding RSI.
    #[serde(default = "default_rsi_interval")]
    pub rsi_interval: String,

    #[serde(default = "default_rsi_limit")]
    pub rsi_limit: u32,

    /// Kline interval of the price chart.
    #[serde(default = "default_chart_interval")]
    pub chart_interval: String,

    #[serde(default = "default_chart_limit")]
    pub chart_limit: u32,

    // --- Planning ---------------------------------------------------------------

    /// Capital used by `/api/v1/plan` when no `capital` query is given.
    #[serde(default = "default_capital")]
    pub default_capital: f64,

    #[serde(default)]
    pub indicators: IndicatorParams,

    // --- Endpoints ----------------------------------------------------------------

    #[serde(default = "default_binance_base_url")]
    pub binance_base_url: String,

    #[serde(default = "default_fear_greed_url")]
    pub fear_greed_url: String,

    /// Address the dashboard API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            refresh_interval_secs: default_refresh_interval_secs(),
            ma_interval: default_ma_interval(),
            ma_limit: default_ma_limit(),
            rsi_interval: default_rsi_interval(),
            rsi_limit: default_rsi_limit(),
            chart_interval: default_chart_interval(),
            chart_limit: default_chart_limit(),
            default_capital: default_capital(),
            indicators: IndicatorParams::default(),
            binance_base_url: default_binance_base_url(),
            fear_greed_url: default_fear_greed_url(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// Returns an error when the file is missing, unparsable or fails
    /// [`EngineConfig::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse engine config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid engine config in {}", path.display()))?;

        info!(
            path = %path.display(),
            symbol = %config.symbol,
            refresh_interval_secs = config.refresh_interval_secs,
            "engine config loaded"
        );

        Ok(config)
    }

    /// Reject settings that would make every cycle fail or produce
    /// meaningless indicators.
    pub fn validate(&self) -> Result<()> {
        let p = &self.indicators;

        ensure!(!self.symbol.trim().is_empty(), "symbol must not be empty");
        ensure!(self.refresh_interval_secs >= 1, "refresh_interval_secs must be at least 1");
        ensure!(
            self.default_capital.is_finite() && self.default_capital > 0.0,
            "default_capital must be positive, got {}",
            self.default_capital
        );

        for (name, period) in [
            ("sma_short", p.sma_short),
            ("sma_medium", p.sma_medium),
            ("sma_long", p.sma_long),
            ("rsi_period", p.rsi_period),
            ("bollinger_period", p.bollinger_period),
            ("volatility_period", p.volatility_period),
        ] {
            ensure!(period >= 1, "indicators.{name} must be at least 1");
        }
        ensure!(
            p.bollinger_multiplier.is_finite() && p.bollinger_multiplier > 0.0,
            "indicators.bollinger_multiplier must be positive, got {}",
            p.bollinger_multiplier
        );

        let ma_limit = self.ma_limit as usize;
        ensure!(
            ma_limit >= p.sma_long,
            "ma_limit ({ma_limit}) must cover sma_long ({})",
            p.sma_long
        );
        ensure!(
            ma_limit >= p.bollinger_period && ma_limit > p.volatility_period,
            "ma_limit ({ma_limit}) must cover the bollinger and volatility look-backs"
        );
        ensure!(
            self.rsi_limit as usize >= p.rsi_period + 1,
            "rsi_limit ({}) must be at least rsi_period + 1 ({})",
            self.rsi_limit,
            p.rsi_period + 1
        );

        Ok(())
    }

    /// Apply `ACCUM_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(symbol) = std::env::var("ACCUM_SYMBOL") {
            let symbol = symbol.trim().to_uppercase();
            if !symbol.is_empty() {
                self.symbol = symbol;
            }
        }
        if let Ok(addr) = std::env::var("ACCUM_BIND_ADDR") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
    }
}
