// =============================================================================
// Dashboard — the complete derived view of one refresh cycle
// =============================================================================
//
// `Dashboard::derive` is the single pure entry point that turns a consistent
// `MarketInputs` bundle into everything the API serves:
//
//   inputs ─► IndicatorSnapshot ─► ZoneSet ─► distances
//          ├► SignalBoard / TrendReading
//          └► PriceRegime + RetailMood ─► Insights
//
// The result is immutable and replaced wholesale on the next cycle.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::allocation::{distance_pct, AllocationPlan, PlanError};
use crate::config::IndicatorParams;
use crate::indicators::{IndicatorDisplay, IndicatorSnapshot};
use crate::insights::Insights;
use crate::market_data::{MarketInputs, MarketSnapshot};
use crate::sentiment::{PriceRegime, RetailMood, SentimentScore};
use crate::signals::{SignalBoard, TrendReading};
use crate::zones::{generate_zones, AccumulationZone, ZoneError, ZoneSet};

/// Chart padding below the lowest of (chart low, deepest zone).
const CHART_FLOOR_PADDING: f64 = 0.95;
/// Chart padding above the chart high.
const CHART_CEILING_PADDING: f64 = 1.02;

/// A zone as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneView {
    #[serde(flatten)]
    pub zone: AccumulationZone,
    pub level: String,
    pub description: String,
    /// How far price must fall to reach the zone, in percent.
    pub distance_pct: f64,
}

/// Y-axis range of the price chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartDomain {
    pub min: f64,
    pub max: f64,
}

/// Everything derived from one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub cycle_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub symbol: String,
    pub market: MarketSnapshot,
    pub sentiment: SentimentScore,
    pub indicators: IndicatorSnapshot,
    /// `indicators` with sentinels in place of unknown values.
    pub indicator_display: IndicatorDisplay,
    pub zones: Vec<ZoneView>,
    pub signals: SignalBoard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendReading>,
    pub price_regime: PriceRegime,
    pub retail_mood: RetailMood,
    pub insights: Insights,
    pub chart: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_domain: Option<ChartDomain>,
    #[serde(skip)]
    zone_set: ZoneSet,
}

impl Dashboard {
    /// Derive the dashboard from a gathered input bundle.
    ///
    /// Fails only when the ticker price cannot anchor a ladder.
    pub fn derive(
        inputs: &MarketInputs,
        params: &IndicatorParams,
        computed_at: DateTime<Utc>,
    ) -> Result<Self, ZoneError> {
        let price = inputs.market.price;

        let indicators = IndicatorSnapshot::compute(
            &inputs.trend_closes,
            &inputs.momentum_closes,
            params,
            computed_at,
        );

        let zone_set = generate_zones(price, &indicators.moving_averages)?;
        let current = zone_set.current_price();

        let zones = zone_set
            .iter()
            .map(|z| ZoneView {
                zone: *z,
                level: z.tier.to_string(),
                description: z.rationale.to_string(),
                distance_pct: distance_pct(current, z.price),
            })
            .collect();

        let price_regime = PriceRegime::classify(inputs.market.change_24h_pct);
        let retail_mood = inputs.sentiment.mood();

        Ok(Self {
            cycle_id: Uuid::new_v4(),
            computed_at,
            symbol: inputs.symbol.clone(),
            market: inputs.market,
            sentiment: inputs.sentiment.clone(),
            signals: SignalBoard::rate(price, &indicators, &inputs.sentiment),
            trend: TrendReading::from_ma20(price, indicators.moving_averages.ma20),
            indicator_display: indicators.display(),
            indicators,
            zones,
            price_regime,
            retail_mood,
            insights: Insights::select(price_regime, retail_mood),
            chart: inputs.chart_closes.clone(),
            chart_domain: chart_domain(&inputs.chart_closes, &zone_set),
            zone_set,
        })
    }

    pub fn zone_set(&self) -> &ZoneSet {
        &self.zone_set
    }

    /// Size `capital` across this cycle's zones.
    pub fn plan(&self, capital: f64) -> Result<AllocationPlan, PlanError> {
        AllocationPlan::build(capital, &self.zone_set)
    }
}

/// Y-axis range covering both the chart and the deepest zone.
pub fn chart_domain(chart: &[f64], zones: &ZoneSet) -> Option<ChartDomain> {
    if chart.is_empty() {
        return None;
    }

    let chart_min = chart.iter().copied().fold(f64::INFINITY, f64::min);
    let chart_max = chart.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let deepest = zones.deepest_price();
    let floor = if deepest > 0.0 { chart_min.min(deepest) } else { chart_min };

    Some(ChartDomain {
        min: floor * CHART_FLOOR_PADDING,
        max: chart_max * CHART_CEILING_PADDING,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{Action, TrendBias};
    use crate::zones::Tier;

    fn inputs(price: f64, change: f64, fear_greed: i64) -> MarketInputs {
        // 210 weekly closes rising from 20_000 to 62_900.
        let weekly: Vec<f64> = (0..210).map(|i| 20_000.0 + 206.25 * i as f64).collect();
        let four_hour: Vec<f64> = (0..60).map(|i| price - 600.0 + 10.0 * i as f64).collect();
        MarketInputs {
            symbol: "BTCUSDT".into(),
            market: MarketSnapshot {
                price,
                change_24h_pct: change,
                high: price * 1.02,
                low: price * 0.97,
                volume: 2.0e9,
            },
            sentiment: SentimentScore::new(fear_greed, "Fear"),
            trend_closes: weekly,
            momentum_closes: four_hour[40..].to_vec(),
            chart_closes: four_hour,
        }
    }

    #[test]
    fn derive_full_cycle() {
        let now = Utc::now();
        let d = Dashboard::derive(&inputs(60_000.0, -3.0, 30), &IndicatorParams::default(), now).unwrap();

        assert_eq!(d.computed_at, now);
        assert_eq!(d.indicators.computed_at, now);
        assert_eq!(d.zones.len(), 3);
        assert!(d.zones[0].zone.price > d.zones[1].zone.price);
        assert!(d.zones[1].zone.price > d.zones[2].zone.price);
        assert_eq!(d.zones[0].level, Tier::Aggressive.to_string());
        for z in &d.zones {
            assert!(z.distance_pct > 0.0, "zone below price must have positive distance");
        }
        assert_eq!(d.price_regime, PriceRegime::WeakPullback);
        assert_eq!(d.retail_mood, RetailMood::FearDominant);
        assert_eq!(d.signals.fear_greed.action, Action::Buy);
        assert!(d.indicators.moving_averages.ma200.is_some());
        assert!(d.indicators.rsi.is_some());
    }

    #[test]
    fn trend_reads_ma20() {
        let d = Dashboard::derive(&inputs(70_000.0, 1.0, 60), &IndicatorParams::default(), Utc::now()).unwrap();
        assert_eq!(d.trend.unwrap().bias, TrendBias::Bullish);
        assert_eq!(d.price_regime, PriceRegime::RangeBound);
    }

    #[test]
    fn plan_uses_the_cycle_zones() {
        let d = Dashboard::derive(&inputs(60_000.0, 0.0, 50), &IndicatorParams::default(), Utc::now()).unwrap();
        let plan = d.plan(10_000.0).unwrap();
        assert_eq!(plan.rows.len(), 3);
        assert_eq!(plan.rows[0].zone, d.zone_set().zones()[0]);
        assert!(d.plan(0.0).is_err());
    }

    #[test]
    fn zero_price_is_rejected() {
        let mut i = inputs(60_000.0, 0.0, 50);
        i.market.price = 0.0;
        assert!(matches!(
            Dashboard::derive(&i, &IndicatorParams::default(), Utc::now()),
            Err(ZoneError::InvalidPrice(_))
        ));
    }

    #[test]
    fn chart_domain_includes_deepest_zone() {
        let d = Dashboard::derive(&inputs(60_000.0, 0.0, 50), &IndicatorParams::default(), Utc::now()).unwrap();
        let domain = d.chart_domain.unwrap();
        let chart_max = d.chart.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((domain.min - d.zone_set().deepest_price() * 0.95).abs() < 1e-9);
        assert!((domain.max - chart_max * 1.02).abs() < 1e-9);
    }

    #[test]
    fn empty_chart_has_no_domain() {
        let mut i = inputs(60_000.0, 0.0, 50);
        i.chart_closes.clear();
        let d = Dashboard::derive(&i, &IndicatorParams::default(), Utc::now()).unwrap();
        assert!(d.chart_domain.is_none());
    }

    #[test]
    fn short_history_still_produces_a_ladder() {
        let mut i = inputs(60_000.0, 0.0, 50);
        i.trend_closes.truncate(10);
        i.momentum_closes.clear();
        let d = Dashboard::derive(&i, &IndicatorParams::default(), Utc::now()).unwrap();
        assert!(d.indicators.moving_averages.ma20.is_none());
        assert!(d.indicators.rsi.is_none());
        assert!(d.trend.is_none());
        assert_eq!(d.indicator_display.ma20, 0.0);
        assert_eq!(d.indicator_display.rsi, 50.0);
        assert_eq!(d.indicator_display.bollinger.percent_b, 0.5);
        assert_eq!(d.zones.len(), 3);
    }

    #[test]
    fn serialises_flattened_zones() {
        let d = Dashboard::derive(&inputs(60_000.0, 0.0, 50), &IndicatorParams::default(), Utc::now()).unwrap();
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["zones"][0]["tier"], "Aggressive");
        assert_eq!(json["zones"][1]["allocation_pct"], 40.0);
        assert!(json.get("zone_set").is_none());
        assert!(json["indicator_display"]["rsi"].is_number());
    }
}
