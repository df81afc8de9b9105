// =============================================================================
// Indicator Snapshot
// =============================================================================
//
// Aggregates every indicator a refresh cycle needs into one immutable value.
// Each field is `Option<f64>`: `None` means the series was too short (or
// degenerate) for that indicator, never "zero".
//
// The presentation layer historically rendered unknown values as fixed
// sentinels (SMA 0, RSI 50, %B 0.5, volatility 0). `IndicatorDisplay`
// reproduces that convention at the boundary only.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::IndicatorParams;
use crate::indicators::bollinger::{calculate_bollinger, BollingerResult};
use crate::indicators::rsi::calculate_rsi;
use crate::indicators::sma::calculate_sma;
use crate::indicators::volatility::calculate_volatility;

/// Shown for an unknown SMA.
pub const SMA_SENTINEL: f64 = 0.0;
/// Shown for an unknown RSI.
pub const RSI_SENTINEL: f64 = 50.0;
/// Shown for unknown volatility.
pub const VOLATILITY_SENTINEL: f64 = 0.0;

/// The three weekly moving averages that anchor the accumulation ladder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub ma200: Option<f64>,
}

impl MovingAverages {
    pub fn from_series(closes: &[f64], params: &IndicatorParams) -> Self {
        Self {
            ma20: calculate_sma(closes, params.sma_short),
            ma50: calculate_sma(closes, params.sma_medium),
            ma200: calculate_sma(closes, params.sma_long),
        }
    }
}

/// Every indicator derived from one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub moving_averages: MovingAverages,
    pub rsi: Option<f64>,
    pub bollinger: Option<BollingerResult>,
    pub volatility_pct: Option<f64>,
    pub computed_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// Compute the snapshot.
    ///
    /// `trend_closes` feeds the moving averages, the bands, and volatility
    /// (weekly cadence in production). `momentum_closes` feeds RSI (4h
    /// cadence). The engine never looks at the sampling interval itself.
    pub fn compute(
        trend_closes: &[f64],
        momentum_closes: &[f64],
        params: &IndicatorParams,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            moving_averages: MovingAverages::from_series(trend_closes, params),
            rsi: calculate_rsi(momentum_closes, params.rsi_period),
            bollinger: calculate_bollinger(
                trend_closes,
                params.bollinger_period,
                params.bollinger_multiplier,
            ),
            volatility_pct: calculate_volatility(trend_closes, params.volatility_period),
            computed_at,
        }
    }

    /// Plain-number view for panels that cannot render "unknown".
    pub fn display(&self) -> IndicatorDisplay {
        IndicatorDisplay {
            ma20: display_sma(self.moving_averages.ma20),
            ma50: display_sma(self.moving_averages.ma50),
            ma200: display_sma(self.moving_averages.ma200),
            rsi: self.rsi.unwrap_or(RSI_SENTINEL),
            bollinger: self.bollinger.unwrap_or(BollingerResult::UNKNOWN),
            volatility_pct: self.volatility_pct.unwrap_or(VOLATILITY_SENTINEL),
        }
    }
}

fn display_sma(value: Option<f64>) -> f64 {
    value.unwrap_or(SMA_SENTINEL)
}

/// `IndicatorSnapshot` with every unknown value replaced by its sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorDisplay {
    pub ma20: f64,
    pub ma50: f64,
    pub ma200: f64,
    pub rsi: f64,
    pub bollinger: BollingerResult,
    pub volatility_pct: f64,
}
