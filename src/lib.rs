// =============================================================================
// Accumulation Engine — library root
// =============================================================================
//
// Pure derivation (indicators → zones → plan, signals, insights) plus the
// service shell around it: market-data providers, the refresh loop, shared
// state and the read-only HTTP/WebSocket API.
// =============================================================================

pub mod allocation;
pub mod api;
pub mod app_state;
pub mod config;
pub mod dashboard;
pub mod indicators;
pub mod insights;
pub mod market_data;
pub mod refresh;
pub mod sentiment;
pub mod signals;
pub mod zones;
