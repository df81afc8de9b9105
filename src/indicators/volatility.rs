// =============================================================================
// Realised Volatility — mean absolute close-to-close return
// =============================================================================
//
//   vol% = mean( |c[i] - c[i-1]| / c[i-1] ) * 100   over the last `period` pairs
//
// The result is rounded to two decimal places because it is only ever shown
// as a percentage.
// =============================================================================

/// Default number of adjacent pairs.
pub const DEFAULT_VOLATILITY_PERIOD: usize = 14;

/// Mean absolute percentage move over the last `period` adjacent pairs.
///
/// Needs `period + 1` closes. Returns `None` when there are too few closes,
/// when `period == 0`, or when a previous close of zero makes a return
/// undefined.
pub fn calculate_volatility(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - period - 1..];
    let mut sum = 0.0;
    for w in window.windows(2) {
        if w[0] == 0.0 {
            return None;
        }
        sum += (w[1] - w[0]).abs() / w[0];
    }

    let pct = sum / period as f64 * 100.0;
    let rounded = (pct * 100.0).round() / 100.0;

    rounded.is_finite().then_some(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn volatility_flat_is_zero() {
        let closes = vec![100.0; 20];
        assert_eq!(calculate_volatility(&closes, 14), Some(0.0));
    }

    #[test]
    fn volatility_insufficient_data() {
        let closes = vec![100.0; 14];
        assert!(calculate_volatility(&closes, 14).is_none());
        assert!(calculate_volatility(&[], 14).is_none());
    }

    #[test]
    fn volatility_constant_swing() {
        // 100 -> 110 -> 100 -> 110: moves of 10%, ~9.09%, 10%.
        let closes = vec![100.0, 110.0, 100.0, 110.0];
        let v = calculate_volatility(&closes, 3).unwrap();
        let expected = ((0.1_f64 + 10.0 / 110.0 + 0.1) / 3.0 * 100.0 * 100.0).round() / 100.0;
        assert!((v - expected).abs() < 1e-12);
        assert!((v - 9.70).abs() < 1e-9);
    }

    #[test]
    fn volatility_rounds_to_two_places() {
        let closes = vec![3.0, 4.0];
        // 1/3 => 33.333...%
        assert_eq!(calculate_volatility(&closes, 1), Some(33.33));
    }

    #[test]
    fn volatility_zero_previous_close_is_unknown() {
        let closes = vec![0.0, 1.0, 2.0];
        assert!(calculate_volatility(&closes, 2).is_none());
    }

    proptest! {
        #[test]
        fn volatility_is_non_negative_and_two_places(
            closes in prop::collection::vec(1.0f64..100_000.0, 15..60),
        ) {
            let v = calculate_volatility(&closes, 14).unwrap();
            prop_assert!(v >= 0.0);
            prop_assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
        }
    }
}
