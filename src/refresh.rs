// =============================================================================
// Refresh Loop — periodically re-derives the dashboard
// =============================================================================
//
// Each tick gathers a complete `MarketInputs` bundle, derives a `Dashboard`
// from it and publishes it. A failed cycle leaves the previously published
// dashboard in place and is recorded in the error log.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::dashboard::Dashboard;
use crate::market_data::{MarketFeed, MarketInputs};
use crate::zones::Tier;

/// Run one gather → derive → publish cycle.
pub async fn run_refresh_cycle<F: MarketFeed + ?Sized>(feed: &F, state: &AppState) -> Result<()> {
    let config = &state.config;

    let inputs = MarketInputs::gather(feed, config).await?;
    let dashboard = Dashboard::derive(&inputs, &config.indicators, Utc::now())
        .with_context(|| format!("zone derivation failed for {}", inputs.symbol))?;

    info!(
        cycle_id = %dashboard.cycle_id,
        symbol = %dashboard.symbol,
        price = dashboard.market.price,
        t1 = dashboard.zone_set().tier(Tier::Aggressive).price,
        t2 = dashboard.zone_set().tier(Tier::Moderate).price,
        t3 = dashboard.zone_set().tier(Tier::Extreme).price,
        regime = %dashboard.price_regime,
        "dashboard refreshed"
    );

    state.publish(dashboard);
    Ok(())
}

/// Refresh forever at the configured interval. The first tick fires
/// immediately.
pub async fn run_refresh_loop(state: Arc<AppState>, feed: Arc<dyn MarketFeed>) {
    let secs = state.config.refresh_interval_secs.max(1);
    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(interval_secs = secs, "refresh loop starting");

    loop {
        interval.tick().await;
        if let Err(e) = run_refresh_cycle(feed.as_ref(), &state).await {
            error!(error = %format!("{e:#}"), "refresh cycle failed, keeping previous dashboard");
            state.push_error(format!("{e:#}"));
        }
    }
}
