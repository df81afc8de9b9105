// =============================================================================
// Sentiment Classification
// =============================================================================
//
// Two independent ordinal classifiers:
//
//   PriceRegime: from the 24h price change (%)
//     change <= -5   CAPITULATION
//     change <= -2   WEAK_PULLBACK
//     change <   2   RANGE_BOUND
//     otherwise      UPTREND
//
//   RetailMood: from the 0..=100 Fear & Greed score
//     score <  20    CAPITULATION_RETAIL
//     score <  40    FEAR_DOMINANT
//     score >  75    EUPHORIA_RISK
//     otherwise      NEUTRAL
//
// Presentation combines the pair to pick narrative text (see `insights`).
// =============================================================================

use serde::{Deserialize, Serialize};

/// Short-term price action regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceRegime {
    Capitulation,
    WeakPullback,
    RangeBound,
    Uptrend,
}

impl PriceRegime {
    pub fn classify(change_24h_pct: f64) -> Self {
        if change_24h_pct <= -5.0 {
            Self::Capitulation
        } else if change_24h_pct <= -2.0 {
            Self::WeakPullback
        } else if change_24h_pct < 2.0 {
            Self::RangeBound
        } else {
            Self::Uptrend
        }
    }
}

impl std::fmt::Display for PriceRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Capitulation => write!(f, "CAPITULATION"),
            Self::WeakPullback => write!(f, "WEAK_PULLBACK"),
            Self::RangeBound => write!(f, "RANGE_BOUND"),
            Self::Uptrend => write!(f, "UPTREND"),
        }
    }
}

/// Crowd mood read from the Fear & Greed index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RetailMood {
    CapitulationRetail,
    FearDominant,
    EuphoriaRisk,
    Neutral,
}

impl RetailMood {
    pub fn classify(score: u8) -> Self {
        if score < 20 {
            Self::CapitulationRetail
        } else if score < 40 {
            Self::FearDominant
        } else if score > 75 {
            Self::EuphoriaRisk
        } else {
            Self::Neutral
        }
    }
}

impl std::fmt::Display for RetailMood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapitulationRetail => write!(f, "CAPITULATION_RETAIL"),
            Self::FearDominant => write!(f, "FEAR_DOMINANT"),
            Self::EuphoriaRisk => write!(f, "EUPHORIA_RISK"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Fear & Greed reading as published by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentScore {
    /// 0 = extreme fear, 100 = extreme greed.
    pub value: u8,
    /// Provider label, e.g. "Extreme Fear".
    pub classification: String,
}

impl SentimentScore {
    /// Build a score, clamping the value into 0..=100.
    pub fn new(value: i64, classification: impl Into<String>) -> Self {
        Self {
            value: value.clamp(0, 100) as u8,
            classification: classification.into(),
        }
    }

    /// Reading used when the provider is unreachable.
    pub fn neutral() -> Self {
        Self::new(50, "Neutral")
    }

    pub fn mood(&self) -> RetailMood {
        RetailMood::classify(self.value)
    }
}
