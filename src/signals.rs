// =============================================================================
// Signal Board — per-indicator action ratings
// =============================================================================
//
// Each dashboard indicator is rated with an action and a 1..=5 conviction
// score. Thresholds:
//
//   RSI (4h)          < 30 STRONG BUY 5 | < 45 BUY 4 | > 70 SELL 2 | WAIT 2
//   Fear & Greed      < 25 STRONG BUY   | < 40 BUY   | WAIT
//                     score: < 20 => 5 | < 40 => 4 | 1
//   %B (weekly)       < 0 STRONG BUY 5  | < 0.2 BUY 2 | WAIT 2
//   Volatility        WAIT 2
//   MA20 (weekly)     price above => BUY 4, else SELL 1
//   MA200 (weekly)    STRONG BUY 5
//
// An indicator whose value is unknown is rated WAIT with score 1.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorSnapshot;
use crate::sentiment::SentimentScore;

/// Suggested action for one indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StrongBuy,
    Buy,
    Wait,
    Sell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Wait => write!(f, "WAIT"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Rating of a single indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRating {
    pub label: String,
    pub value: Option<f64>,
    pub action: Action,
    /// Conviction, 1..=5.
    pub score: u8,
}

impl SignalRating {
    fn new(label: &str, value: Option<f64>, action: Action, score: u8) -> Self {
        Self {
            label: label.to_string(),
            value,
            action,
            score,
        }
    }

    fn unknown(label: &str) -> Self {
        Self::new(label, None, Action::Wait, 1)
    }
}

/// Position of price relative to the 20-week average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendBias {
    Bullish,
    Bearish,
}

/// Trend bias with the gap to MA20.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub bias: TrendBias,
    /// Percentage above MA20 (positive) or below it (negative), relative to
    /// MA20.
    pub gap_pct: f64,
}

impl TrendReading {
    pub fn from_ma20(current_price: f64, ma20: Option<f64>) -> Option<Self> {
        let ma20 = ma20.filter(|m| *m > 0.0)?;
        let bias = if current_price > ma20 {
            TrendBias::Bullish
        } else {
            TrendBias::Bearish
        };
        Some(Self {
            bias,
            gap_pct: (current_price - ma20) / ma20 * 100.0,
        })
    }
}

/// All ratings shown on the indicator panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBoard {
    pub rsi: SignalRating,
    pub fear_greed: SignalRating,
    pub percent_b: SignalRating,
    pub volatility: SignalRating,
    pub ma20: SignalRating,
    pub ma200: SignalRating,
}

impl SignalBoard {
    pub fn rate(current_price: f64, indicators: &IndicatorSnapshot, sentiment: &SentimentScore) -> Self {
        Self {
            rsi: rate_rsi(indicators.rsi),
            fear_greed: rate_fear_greed(sentiment.value),
            percent_b: rate_percent_b(indicators.bollinger.map(|b| b.percent_b)),
            volatility: match indicators.volatility_pct {
                Some(v) => SignalRating::new("Volatility (Weekly)", Some(v), Action::Wait, 2),
                None => SignalRating::unknown("Volatility (Weekly)"),
            },
            ma20: rate_ma20(current_price, indicators.moving_averages.ma20),
            ma200: match indicators.moving_averages.ma200 {
                Some(v) => SignalRating::new("MA200 Weekly", Some(v), Action::StrongBuy, 5),
                None => SignalRating::unknown("MA200 Weekly"),
            },
        }
    }
}

pub fn rate_rsi(rsi: Option<f64>) -> SignalRating {
    const LABEL: &str = "RSI (4H)";
    let Some(v) = rsi else {
        return SignalRating::unknown(LABEL);
    };
    let (action, score) = if v < 30.0 {
        (Action::StrongBuy, 5)
    } else if v < 45.0 {
        (Action::Buy, 4)
    } else if v > 70.0 {
        (Action::Sell, 2)
    } else {
        (Action::Wait, 2)
    };
    SignalRating::new(LABEL, Some(v), action, score)
}

pub fn rate_fear_greed(value: u8) -> SignalRating {
    let action = if value < 25 {
        Action::StrongBuy
    } else if value < 40 {
        Action::Buy
    } else {
        Action::Wait
    };
    // Score bands differ from the action bands (20 vs 25).
    let score = if value < 20 {
        5
    } else if value < 40 {
        4
    } else {
        1
    };
    SignalRating::new("Fear & Greed", Some(f64::from(value)), action, score)
}

pub fn rate_percent_b(percent_b: Option<f64>) -> SignalRating {
    const LABEL: &str = "BB %B (Weekly)";
    let Some(v) = percent_b else {
        return SignalRating::unknown(LABEL);
    };
    let (action, score) = if v < 0.0 {
        (Action::StrongBuy, 5)
    } else if v < 0.2 {
        (Action::Buy, 2)
    } else {
        (Action::Wait, 2)
    };
    SignalRating::new(LABEL, Some(v), action, score)
}

pub fn rate_ma20(current_price: f64, ma20: Option<f64>) -> SignalRating {
    const LABEL: &str = "MA20 Weekly";
    match ma20 {
        Some(v) if current_price > v => SignalRating::new(LABEL, Some(v), Action::Buy, 4),
        Some(v) => SignalRating::new(LABEL, Some(v), Action::Sell, 1),
        None => SignalRating::unknown(LABEL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{BollingerResult, MovingAverages};
    use chrono::Utc;

    #[test]
    fn rsi_bands() {
        assert_eq!(rate_rsi(Some(12.0)).action, Action::StrongBuy);
        assert_eq!(rate_rsi(Some(12.0)).score, 5);
        assert_eq!(rate_rsi(Some(44.9)).action, Action::Buy);
        assert_eq!(rate_rsi(Some(55.0)).action, Action::Wait);
        assert_eq!(rate_rsi(Some(70.0)).action, Action::Wait);
        assert_eq!(rate_rsi(Some(70.1)).action, Action::Sell);
        assert_eq!(rate_rsi(None), SignalRating::unknown("RSI (4H)"));
    }

    #[test]
    fn fear_greed_action_and_score_bands_differ() {
        let r = rate_fear_greed(22);
        assert_eq!(r.action, Action::StrongBuy);
        assert_eq!(r.score, 4);

        let r = rate_fear_greed(10);
        assert_eq!((r.action, r.score), (Action::StrongBuy, 5));

        let r = rate_fear_greed(39);
        assert_eq!((r.action, r.score), (Action::Buy, 4));

        let r = rate_fear_greed(60);
        assert_eq!((r.action, r.score), (Action::Wait, 1));
    }

    #[test]
    fn percent_b_bands() {
        assert_eq!(rate_percent_b(Some(-0.1)).action, Action::StrongBuy);
        assert_eq!(rate_percent_b(Some(0.1)).action, Action::Buy);
        assert_eq!(rate_percent_b(Some(0.5)).action, Action::Wait);
    }

    #[test]
    fn ma20_above_and_below() {
        assert_eq!(rate_ma20(60_000.0, Some(58_000.0)).action, Action::Buy);
        assert_eq!(rate_ma20(50_000.0, Some(58_000.0)).action, Action::Sell);
        assert_eq!(rate_ma20(50_000.0, None).score, 1);
    }

    #[test]
    fn trend_reading() {
        let t = TrendReading::from_ma20(55_000.0, Some(50_000.0)).unwrap();
        assert_eq!(t.bias, TrendBias::Bullish);
        assert!((t.gap_pct - 10.0).abs() < 1e-12);

        let t = TrendReading::from_ma20(45_000.0, Some(50_000.0)).unwrap();
        assert_eq!(t.bias, TrendBias::Bearish);
        assert!((t.gap_pct + 10.0).abs() < 1e-12);

        assert!(TrendReading::from_ma20(45_000.0, None).is_none());
    }

    #[test]
    fn board_with_unknown_indicators() {
        let snap = IndicatorSnapshot {
            moving_averages: MovingAverages::default(),
            rsi: None,
            bollinger: None,
            volatility_pct: None,
            computed_at: Utc::now(),
        };
        let board = SignalBoard::rate(60_000.0, &snap, &SentimentScore::neutral());
        assert_eq!(board.rsi.action, Action::Wait);
        assert_eq!(board.ma200.score, 1);
        assert_eq!(board.fear_greed.value, Some(50.0));
    }

    #[test]
    fn board_with_full_snapshot() {
        let snap = IndicatorSnapshot {
            moving_averages: MovingAverages {
                ma20: Some(58_000.0),
                ma50: Some(50_000.0),
                ma200: Some(30_000.0),
            },
            rsi: Some(25.0),
            bollinger: Some(BollingerResult {
                upper: 70_000.0,
                middle: 60_000.0,
                lower: 50_000.0,
                percent_b: 0.1,
            }),
            volatility_pct: Some(3.2),
            computed_at: Utc::now(),
        };
        let board = SignalBoard::rate(60_000.0, &snap, &SentimentScore::new(15, "Extreme Fear"));
        assert_eq!(board.rsi.action, Action::StrongBuy);
        assert_eq!(board.fear_greed.score, 5);
        assert_eq!(board.percent_b.action, Action::Buy);
        assert_eq!(board.volatility.score, 2);
        assert_eq!(board.ma20.action, Action::Buy);
        assert_eq!(board.ma200.action, Action::StrongBuy);
        assert_eq!(Action::StrongBuy.to_string(), "STRONG BUY");
    }
}
