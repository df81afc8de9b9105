// =============================================================================
// Relative Strength Index (RSI) — simple-average window
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Only the last `period + 1` closes are used (that is, `period` deltas):
//
// Step 1: gains  = sum of positive deltas in the window
//          losses = sum of |negative deltas| in the window
// Step 2: avg_gain = gains / period,  avg_loss = losses / period
// Step 3: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// No Wilder smoothing is applied: the reading is a snapshot of one window.
// =============================================================================

/// Default look-back for RSI.
pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Compute the RSI of the most recent `period` deltas.
///
/// # Edge cases
/// - `period == 0` => `None`
/// - `closes.len() < period + 1` => `None`
/// - average loss of zero saturates at 100.0, including a perfectly flat
///   window (no losses at all).
/// - non-finite results => `None`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - period - 1..];

    let (gains, losses) = window.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), w| {
        let delta = w[1] - w[0];
        if delta >= 0.0 {
            (g + delta, l)
        } else {
            (g, l - delta)
        }
    });

    let period_f = period as f64;
    rsi_from_averages(gains / period_f, losses / period_f)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        100.0 // RS is unbounded.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi)
}
