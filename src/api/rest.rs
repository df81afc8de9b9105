// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are read-only. Data endpoints answer
// 503 until the first refresh cycle has published a dashboard.
//
// CORS is configured permissively; the dashboard front-end is served from a
// different origin.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::allocation::AllocationPlan;
use crate::app_state::AppState;
use crate::dashboard::{Dashboard, ZoneView};

type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/zones", get(zones))
        .route("/api/v1/plan", get(plan))
        // ── WebSocket (handled in the ws module but mounted here) ───────
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        // ── Middleware & State ──────────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

fn error_body(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

fn latest(state: &AppState) -> Result<Arc<Dashboard>, ApiError> {
    state.dashboard().ok_or_else(|| {
        error_body(
            StatusCode::SERVICE_UNAVAILABLE,
            "No market data yet: the first refresh cycle has not completed",
        )
    })
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.build_health())
}

// =============================================================================
// Dashboard
// =============================================================================

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let d = latest(&state)?;
    Ok(Json(Dashboard::clone(&d)))
}

// =============================================================================
// Zones
// =============================================================================

#[derive(Serialize)]
struct ZonesResponse {
    symbol: String,
    current_price: f64,
    computed_at: DateTime<Utc>,
    zones: Vec<ZoneView>,
}

async fn zones(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let d = latest(&state)?;
    Ok(Json(ZonesResponse {
        symbol: d.symbol.clone(),
        current_price: d.market.price,
        computed_at: d.computed_at,
        zones: d.zones.clone(),
    }))
}

// =============================================================================
// Allocation plan
// =============================================================================

#[derive(Deserialize)]
struct PlanQuery {
    capital: Option<String>,
}

#[derive(Serialize)]
struct PlanResponse {
    symbol: String,
    current_price: f64,
    #[serde(flatten)]
    plan: AllocationPlan,
    total_quantity: f64,
    average_entry: f64,
}

async fn plan(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlanQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let capital = match query.capital.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => raw.parse::<f64>().map_err(|_| {
            error_body(
                StatusCode::BAD_REQUEST,
                format!("Invalid capital: '{raw}' is not a number"),
            )
        })?,
        _ => state.config.default_capital,
    };

    let d = latest(&state)?;
    let plan = d
        .plan(capital)
        .map_err(|e| error_body(StatusCode::BAD_REQUEST, e.to_string()))?;

    debug!(capital, cycle_id = %d.cycle_id, "allocation plan built");

    Ok(Json(PlanResponse {
        symbol: d.symbol.clone(),
        current_price: d.market.price,
        total_quantity: plan.total_quantity(),
        average_entry: plan.average_entry(),
        plan,
    }))
}
