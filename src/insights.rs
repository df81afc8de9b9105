// =============================================================================
// Market Insights — narrative text keyed by sentiment labels
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::sentiment::{PriceRegime, RetailMood};

/// Narrative panel shown next to the zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub snapshot: String,
    pub retail: String,
    pub whale: String,
    pub psychology: String,
    pub advice: String,
}

impl Insights {
    pub fn select(regime: PriceRegime, mood: RetailMood) -> Self {
        let (snapshot, whale, psychology, advice) = match regime {
            PriceRegime::Capitulation => (
                "Deeply oversold: panic selling is flooding in and sentiment is frozen. \
                 Price is stretched far from its averages and a relief bounce can come at any time.",
                "Smart money is laddering bids below to absorb panic supply.",
                "\"It won't stop falling, should I cut my losses first?\"",
                "A classic golden pit. Buy in tranches and do not hand over coins in the panic.",
            ),
            PriceRegime::WeakPullback => (
                "Weak pullback: support is being tested and short-term selling pressure is not yet absorbed.",
                "Large holders are watching and waiting for retail to be shaken out.",
                "\"Down again, so annoying. Maybe trade the swing?\"",
                "Wait patiently for price to revisit the T1 or T2 zone.",
            ),
            PriceRegime::RangeBound => (
                "Tight range: bulls and bears are balanced while the market waits for direction.",
                "On-chain activity is quiet.",
                "\"This chop is so boring...\"",
                "Stay in cash, or try a small position near the lower Bollinger band.",
            ),
            PriceRegime::Uptrend => (
                "Uptrend: price is running above its averages and bulls are in control.",
                "Capital keeps flowing in.",
                "\"It's pumping! Should I chase?\"",
                "Do not chase highs. Wait for a pullback.",
            ),
        };

        let retail = match mood {
            RetailMood::CapitulationRetail => "Retail is capitulating in despair.",
            RetailMood::FearDominant => "Retail is still shaken and mostly on the sidelines.",
            RetailMood::EuphoriaRisk => "Retail is euphoric. Mind the risk.",
            RetailMood::Neutral => "Retail sentiment is neutral.",
        };

        Self {
            snapshot: snapshot.to_string(),
            retail: retail.to_string(),
            whale: whale.to_string(),
            psychology: psychology.to_string(),
            advice: advice.to_string(),
        }
    }
}
