// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean of the most recent `period` closes. Only the tail of the
// series participates; anything older than the window has no influence.
//
// The weekly 20 / 50 / 200 SMAs are the anchors of the accumulation ladder,
// so an unknown average must never be confused with a real price level.
// =============================================================================

/// Mean of the last `period` closes.
///
/// Returns `None` when:
/// - `period == 0`
/// - `closes.len() < period`
/// - the mean is non-finite
pub fn calculate_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }

    let window = &closes[closes.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;

    mean.is_finite().then_some(mean)
}
