// =============================================================================
// Accumulation Engine — Main Entry Point
// =============================================================================
//
// Starts the refresh loop against the live providers and serves the derived
// dashboard over HTTP/WebSocket. The engine only reads market data; it never
// places orders.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use accumulation_engine::app_state::AppState;
use accumulation_engine::config::EngineConfig;
use accumulation_engine::market_data::{LiveFeed, MarketFeed};
use accumulation_engine::{api, refresh};

const DEFAULT_CONFIG_PATH: &str = "engine_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Accumulation Engine starting up");

    let config_path =
        std::env::var("ACCUM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if std::path::Path::new(&config_path).exists() {
        EngineConfig::load(&config_path)?
    } else {
        warn!(path = %config_path, "Config file not found, using defaults");
        EngineConfig::default()
    };
    config.apply_env_overrides();
    config.validate().context("invalid configuration after environment overrides")?;

    info!(
        symbol = %config.symbol,
        refresh_interval_secs = config.refresh_interval_secs,
        bind_addr = %config.bind_addr,
        "Configuration resolved"
    );

    // ── 2. Providers & shared state ──────────────────────────────────────
    let feed: Arc<dyn MarketFeed> = Arc::new(LiveFeed::from_config(&config)?);
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config));

    // ── 3. Refresh loop ──────────────────────────────────────────────────
    tokio::spawn(refresh::run_refresh_loop(state.clone(), feed));

    // ── 4. API server ────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::router(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received, stopping gracefully");

    info!("Accumulation Engine shut down complete.");
    Ok(())
}
