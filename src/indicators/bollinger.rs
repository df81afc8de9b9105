// =============================================================================
// Bollinger Bands / %B
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the same window.
//
// %B locates the latest close inside the band range:
//   %B = (close - lower) / (upper - lower)
// %B < 0 means the close sits below the lower band; %B > 1 above the upper.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::sma::calculate_sma;

/// Default look-back for the bands.
pub const DEFAULT_BB_PERIOD: usize = 20;
/// Default band width in standard deviations.
pub const DEFAULT_BB_MULTIPLIER: f64 = 2.0;
/// %B reported when the bands collapse onto the middle (zero variance).
pub const NEUTRAL_PERCENT_B: f64 = 0.5;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub percent_b: f64,
}

impl BollingerResult {
    /// Placeholder used by presentation when the bands are unknown.
    pub const UNKNOWN: Self = Self {
        upper: 0.0,
        middle: 0.0,
        lower: 0.0,
        percent_b: NEUTRAL_PERCENT_B,
    };
}

/// Calculate Bollinger Bands over the last `period` closes.
///
/// Returns `Some(BollingerResult)` containing:
/// - `upper`     = SMA + `multiplier` * σ
/// - `middle`    = SMA
/// - `lower`     = SMA - `multiplier` * σ
/// - `percent_b` = (last - lower) / (upper - lower), or
///   [`NEUTRAL_PERCENT_B`] when upper == lower
///
/// Returns `None` when:
/// - Fewer than `period` data points (or `period == 0`).
/// - `multiplier` is not positive and finite (the bands would invert).
/// - Any band is non-finite.
pub fn calculate_bollinger(closes: &[f64], period: usize, multiplier: f64) -> Option<BollingerResult> {
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return None;
    }
    let middle = calculate_sma(closes, period)?;

    let window = &closes[closes.len() - period..];
    let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / period as f64;
    let std_dev = variance.sqrt();

    let upper = middle + multiplier * std_dev;
    let lower = middle - multiplier * std_dev;
    let last = *closes.last()?;

    let range = upper - lower;
    let percent_b = if range == 0.0 {
        NEUTRAL_PERCENT_B
    } else {
        (last - lower) / range
    };

    if upper.is_finite() && lower.is_finite() && percent_b.is_finite() {
        Some(BollingerResult {
            upper,
            middle,
            lower,
            percent_b,
        })
    } else {
        None
    }
}
