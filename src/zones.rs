// =============================================================================
// Accumulation Zones — three-tier waterfall ladder
// =============================================================================
//
// Derives three limit-buy thresholds from the weekly moving averages and the
// current price:
//
//   T1  Aggressive (front-run)  20%   just above MA20, or a 5% dip buy
//   T2  Moderate   (support)    40%   MA50
//   T3  Extreme    (deep)       40%   MA200
//
// Pass 1: each tier is derived and clamped below the current price on its
//          own.
// Pass 2: the waterfall: T2 is pushed under T1, then T3 is pushed under the
//          (possibly corrected) T2.  The second step must read T2 after the
//          first step has run.
//
// Output invariant:  T1 > T2 > T3 > 0,  weights 20 / 40 / 40.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::MovingAverages;

// T1
const FRONT_RUN_PREMIUM: f64 = 1.04;
const DIP_BUY_RATIO: f64 = 0.95;
const MA20_FALLBACK_RATIO: f64 = 0.85;
const T1_SAFETY_RATIO: f64 = 0.98;
// T2
const MA50_FALLBACK_RATIO: f64 = 0.70;
const BROKEN_MODERATE_RATIO: f64 = 0.85;
const STRUCTURAL_CORRECTION_RATIO: f64 = 0.90;
// T3
const MA200_FALLBACK_RATIO: f64 = 0.50;
const BROKEN_DEEP_RATIO: f64 = 0.65;
const EXTREME_FLOOR_RATIO: f64 = 0.85;

// =============================================================================
// Types
// =============================================================================

/// Accumulation tier, ordered from the highest threshold to the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Aggressive,
    Moderate,
    Extreme,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Aggressive, Tier::Moderate, Tier::Extreme];

    /// 1-based tier number.
    pub fn number(self) -> u8 {
        match self {
            Self::Aggressive => 1,
            Self::Moderate => 2,
            Self::Extreme => 3,
        }
    }

    /// Fixed share of total capital assigned to this tier, in percent.
    pub fn allocation_pct(self) -> f64 {
        match self {
            Self::Aggressive => 20.0,
            Self::Moderate => 40.0,
            Self::Extreme => 40.0,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aggressive => write!(f, "Aggressive (Front-Run)"),
            Self::Moderate => write!(f, "Moderate (Support)"),
            Self::Extreme => write!(f, "Extreme (Deep)"),
        }
    }
}

/// Why a tier ended up at its price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneRationale {
    /// T1 anchored just above the 20-week average (or the dip buy).
    FrontRunMa20,
    /// T1 with MA20 unknown; anchored on 85% of price.
    FrontRunEstimate,
    /// T1 landed at or above price and was pulled to 98% of price.
    SafetyClamp,
    /// T2 on the 50-week average.
    MediumTrendSupport,
    /// T2 with MA50 unknown; 70% of price.
    MediumTrendEstimate,
    /// MA50 at or above price; T2 moved to 85% of price.
    BrokenModerateSupport,
    /// T2 was not below T1; moved to 90% of T1.
    StructuralCorrection,
    /// T3 on the 200-week average.
    CycleFloor,
    /// T3 with MA200 unknown; 50% of price.
    CycleFloorEstimate,
    /// MA200 at or above price; T3 moved to 65% of price.
    BrokenDeepSupport,
    /// T3 was not below T2; moved to 85% of T2.
    ExtremeFloorCorrection,
}

impl std::fmt::Display for ZoneRationale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::FrontRunMa20 => "front-run ambush (MA20W+)",
            Self::FrontRunEstimate => "front-run ambush (MA20W unknown, 85% base)",
            Self::SafetyClamp => "safety clamp (2% below price)",
            Self::MediumTrendSupport => "MA50 weekly (medium-term trend)",
            Self::MediumTrendEstimate => "medium-term estimate (70% of price)",
            Self::BrokenModerateSupport => "MA50W broken (deep-dip support)",
            Self::StructuralCorrection => "structural correction (T1 -10%)",
            Self::CycleFloor => "MA200 weekly (cycle floor)",
            Self::CycleFloorEstimate => "cycle-floor estimate (50% of price)",
            Self::BrokenDeepSupport => "MA200W broken (black swan)",
            Self::ExtremeFloorCorrection => "extreme-floor correction (T2 -15%)",
        };
        f.write_str(text)
    }
}

/// One rung of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulationZone {
    pub tier: Tier,
    pub price: f64,
    pub allocation_pct: f64,
    pub rationale: ZoneRationale,
}

/// The three zones of one refresh cycle, in tier order.
///
/// Fields are private: the only way to obtain a `ZoneSet` is
/// [`generate_zones`], so the strict-descent invariant always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSet {
    current_price: f64,
    zones: [AccumulationZone; 3],
}

impl ZoneSet {
    pub fn current_price(&self) -> f64 {
        self.current_price
    }

    pub fn zones(&self) -> &[AccumulationZone; 3] {
        &self.zones
    }

    pub fn tier(&self, tier: Tier) -> &AccumulationZone {
        &self.zones[usize::from(tier.number() - 1)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccumulationZone> {
        self.zones.iter()
    }

    /// Lowest threshold on the ladder (always T3).
    pub fn deepest_price(&self) -> f64 {
        self.zones[2].price
    }
}

/// Reasons a ladder cannot be produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ZoneError {
    #[error("current price must be positive and finite, got {0}")]
    InvalidPrice(f64),

    #[error("tier {tier} collapsed to {price} at current price {current_price}")]
    DegenerateLadder {
        tier: u8,
        price: f64,
        current_price: f64,
    },
}

// =============================================================================
// Generation
// =============================================================================

#[derive(Clone, Copy)]
struct Rung {
    price: f64,
    rationale: ZoneRationale,
}

/// A moving average is only usable when it is a real, positive price.
fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Build the three-tier ladder for `current_price`.
pub fn generate_zones(current_price: f64, mas: &MovingAverages) -> Result<ZoneSet, ZoneError> {
    if !current_price.is_finite() || current_price <= 0.0 {
        return Err(ZoneError::InvalidPrice(current_price));
    }

    // ── Pass 1: independent tiers ───────────────────────────────────────
    let t1 = {
        let (base, rationale) = match known(mas.ma20) {
            Some(ma20) => (ma20, ZoneRationale::FrontRunMa20),
            None => (current_price * MA20_FALLBACK_RATIO, ZoneRationale::FrontRunEstimate),
        };
        let front_run = base * FRONT_RUN_PREMIUM;
        let dip_buy = current_price * DIP_BUY_RATIO;
        let price = front_run.max(dip_buy).floor();
        if price >= current_price {
            Rung {
                price: (current_price * T1_SAFETY_RATIO).floor(),
                rationale: ZoneRationale::SafetyClamp,
            }
        } else {
            Rung { price, rationale }
        }
    };

    let t2 = match known(mas.ma50) {
        Some(ma50) if ma50.floor() >= current_price => Rung {
            price: (current_price * BROKEN_MODERATE_RATIO).floor(),
            rationale: ZoneRationale::BrokenModerateSupport,
        },
        Some(ma50) => Rung {
            price: ma50.floor(),
            rationale: ZoneRationale::MediumTrendSupport,
        },
        None => Rung {
            price: (current_price * MA50_FALLBACK_RATIO).floor(),
            rationale: ZoneRationale::MediumTrendEstimate,
        },
    };

    let t3 = match known(mas.ma200) {
        Some(ma200) if ma200.floor() >= current_price => Rung {
            price: (current_price * BROKEN_DEEP_RATIO).floor(),
            rationale: ZoneRationale::BrokenDeepSupport,
        },
        Some(ma200) => Rung {
            price: ma200.floor(),
            rationale: ZoneRationale::CycleFloor,
        },
        None => Rung {
            price: (current_price * MA200_FALLBACK_RATIO).floor(),
            rationale: ZoneRationale::CycleFloorEstimate,
        },
    };

    let mut ladder = [t1, t2, t3];

    // ── Pass 2: waterfall ───────────────────────────────────────────────
    if ladder[1].price >= ladder[0].price {
        debug!(t1 = ladder[0].price, t2 = ladder[1].price, "T2 not below T1, applying structural correction");
        ladder[1] = Rung {
            price: (ladder[0].price * STRUCTURAL_CORRECTION_RATIO).floor(),
            rationale: ZoneRationale::StructuralCorrection,
        };
    }
    if ladder[2].price >= ladder[1].price {
        debug!(t2 = ladder[1].price, t3 = ladder[2].price, "T3 not below T2, applying extreme-floor correction");
        ladder[2] = Rung {
            price: (ladder[1].price * EXTREME_FLOOR_RATIO).floor(),
            rationale: ZoneRationale::ExtremeFloorCorrection,
        };
    }

    // Flooring can only break the ladder when prices are a few units wide.
    let mut previous = current_price;
    for (tier, rung) in Tier::ALL.iter().zip(ladder.iter()) {
        if rung.price <= 0.0 || rung.price >= previous {
            return Err(ZoneError::DegenerateLadder {
                tier: tier.number(),
                price: rung.price,
                current_price,
            });
        }
        previous = rung.price;
    }

    let zones = [0, 1, 2].map(|i| {
        let tier = Tier::ALL[i];
        AccumulationZone {
            tier,
            price: ladder[i].price,
            allocation_pct: tier.allocation_pct(),
            rationale: ladder[i].rationale,
        }
    });

    debug!(
        current_price,
        t1 = zones[0].price,
        t2 = zones[1].price,
        t3 = zones[2].price,
        "accumulation zones generated"
    );

    Ok(ZoneSet {
        current_price,
        zones,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mas(ma20: Option<f64>, ma50: Option<f64>, ma200: Option<f64>) -> MovingAverages {
        MovingAverages { ma20, ma50, ma200 }
    }

    fn prices(set: &ZoneSet) -> [f64; 3] {
        let zones = *set.zones();
        zones.map(|z| z.price)
    }

    #[test]
    fn broken_ma50_example() {
        let set = generate_zones(60_000.0, &mas(Some(58_000.0), Some(61_000.0), Some(30_000.0))).unwrap();
        assert_eq!(prices(&set), [58_800.0, 51_000.0, 30_000.0]);
        assert_eq!(set.tier(Tier::Aggressive).rationale, ZoneRationale::SafetyClamp);
        assert_eq!(set.tier(Tier::Moderate).rationale, ZoneRationale::BrokenModerateSupport);
        assert_eq!(set.tier(Tier::Extreme).rationale, ZoneRationale::CycleFloor);
    }

    #[test]
    fn all_averages_unknown_uses_price_ratios() {
        let p = 60_000.0_f64;
        let set = generate_zones(p, &MovingAverages::default()).unwrap();
        assert_eq!(
            prices(&set),
            [(p * 0.95).floor(), (p * 0.70).floor(), (p * 0.50).floor()]
        );
        assert_eq!(set.tier(Tier::Aggressive).rationale, ZoneRationale::FrontRunEstimate);
        assert_eq!(set.tier(Tier::Moderate).rationale, ZoneRationale::MediumTrendEstimate);
        assert_eq!(set.tier(Tier::Extreme).rationale, ZoneRationale::CycleFloorEstimate);
    }

    #[test]
    fn front_run_beats_dip_buy_when_ma20_is_close() {
        // 56_000 * 1.04 = 58_240 > 57_000 dip buy, still below price.
        let set = generate_zones(60_000.0, &mas(Some(56_000.0), Some(45_000.0), Some(25_000.0))).unwrap();
        assert_eq!(set.tier(Tier::Aggressive).price, (56_000.0_f64 * 1.04).floor());
        assert_eq!(set.tier(Tier::Aggressive).rationale, ZoneRationale::FrontRunMa20);
        assert_eq!(set.tier(Tier::Moderate).price, 45_000.0);
        assert_eq!(set.tier(Tier::Extreme).price, 25_000.0);
    }

    #[test]
    fn waterfall_corrects_both_lower_tiers_in_sequence() {
        // T1 = 57_000 (dip buy), MA50 58_000 >= T1, MA200 55_000 >= corrected T2.
        let set = generate_zones(60_000.0, &mas(Some(40_000.0), Some(58_000.0), Some(55_000.0))).unwrap();
        let t2 = (57_000.0_f64 * 0.90).floor();
        let t3 = (t2 * 0.85).floor();
        assert_eq!(prices(&set), [57_000.0, t2, t3]);
        assert_eq!(set.tier(Tier::Moderate).rationale, ZoneRationale::StructuralCorrection);
        assert_eq!(set.tier(Tier::Extreme).rationale, ZoneRationale::ExtremeFloorCorrection);
    }

    #[test]
    fn tier3_correction_reads_corrected_tier2() {
        // MA200 sits between corrected T2 and original MA50: only the
        // sequential pass catches it.
        let set = generate_zones(60_000.0, &mas(Some(40_000.0), Some(58_000.0), Some(52_000.0))).unwrap();
        let t2 = (57_000.0_f64 * 0.90).floor();
        assert!(52_000.0 >= t2);
        assert_eq!(set.tier(Tier::Extreme).price, (t2 * 0.85).floor());
    }

    #[test]
    fn broken_deep_support() {
        let set = generate_zones(60_000.0, &mas(Some(58_000.0), Some(50_000.0), Some(65_000.0))).unwrap();
        assert_eq!(set.tier(Tier::Extreme).price, (60_000.0_f64 * 0.65).floor());
        assert_eq!(set.tier(Tier::Extreme).rationale, ZoneRationale::BrokenDeepSupport);
    }

    #[test]
    fn non_positive_average_counts_as_unknown() {
        let a = generate_zones(60_000.0, &mas(Some(0.0), Some(-1.0), Some(f64::NAN))).unwrap();
        let b = generate_zones(60_000.0, &MovingAverages::default()).unwrap();
        assert_eq!(prices(&a), prices(&b));
    }

    #[test]
    fn allocation_weights_are_fixed() {
        let set = generate_zones(42_000.0, &MovingAverages::default()).unwrap();
        let weights: Vec<f64> = set.iter().map(|z| z.allocation_pct).collect();
        assert_eq!(weights, vec![20.0, 40.0, 40.0]);
        assert_eq!(weights.iter().sum::<f64>(), 100.0);
    }

    #[test]
    fn invalid_current_price_rejected() {
        for p in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                generate_zones(p, &MovingAverages::default()),
                Err(ZoneError::InvalidPrice(_))
            ));
        }
    }

    #[test]
    fn tiny_price_is_degenerate() {
        assert!(matches!(
            generate_zones(1.0, &MovingAverages::default()),
            Err(ZoneError::DegenerateLadder { tier: 1, .. })
        ));
    }

    #[test]
    fn sub_five_unit_symbols_cannot_form_a_ladder() {
        let none = MovingAverages::default();
        assert!(matches!(
            generate_zones(0.15, &none),
            Err(ZoneError::DegenerateLadder { tier: 1, .. })
        ));
        // 2.5 → T1 2, T2 1, T3 corrected from 1 down to 0.
        assert!(matches!(
            generate_zones(2.5, &none),
            Err(ZoneError::DegenerateLadder { tier: 3, .. })
        ));
        let set = generate_zones(10.0, &none).unwrap();
        let prices: Vec<f64> = set.iter().map(|z| z.price).collect();
        assert_eq!(prices, vec![9.0, 7.0, 5.0]);
    }

    #[test]
    fn tier_display_and_numbers() {
        assert_eq!(Tier::Aggressive.number(), 1);
        assert_eq!(Tier::Extreme.number(), 3);
        assert_eq!(Tier::Moderate.to_string(), "Moderate (Support)");
        assert_eq!(
            ZoneRationale::StructuralCorrection.to_string(),
            "structural correction (T1 -10%)"
        );
    }

    fn arb_average() -> impl Strategy<Value = Option<f64>> {
        prop_oneof![Just(None), (10.0..200_000.0_f64).prop_map(Some)]
    }

    proptest! {
        #[test]
        fn ladder_always_strictly_descends(
            price in 100.0..150_000.0_f64,
            ma20 in arb_average(),
            ma50 in arb_average(),
            ma200 in arb_average(),
        ) {
            let set = generate_zones(price, &mas(ma20, ma50, ma200)).unwrap();
            let [t1, t2, t3] = prices(&set);
            prop_assert!(t1 < price);
            prop_assert!(t1 > t2, "t1={t1} t2={t2}");
            prop_assert!(t2 > t3, "t2={t2} t3={t3}");
            prop_assert!(t3 > 0.0);
            let weights: Vec<f64> = set.iter().map(|z| z.allocation_pct).collect();
            prop_assert_eq!(weights, vec![20.0, 40.0, 40.0]);
        }
    }
}
