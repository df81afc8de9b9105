// =============================================================================
// Central Application State
// =============================================================================
//
// The single source of truth shared by the refresh loop and the API. The
// latest `Dashboard` is held behind an `Arc` so a publish is one pointer swap
// under the write lock: readers either see the previous cycle or the new
// one, never a partial mix.
//
// Thread safety:
//   - Atomic counters for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared values.
//   - The configuration is fixed at startup and read without locking.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dashboard::Dashboard;

// =============================================================================
// Error Record
// =============================================================================

/// A failed refresh cycle, kept for the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    pub message: String,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

/// Maximum number of recent errors to retain.
const MAX_RECENT_ERRORS: usize = 50;

pub struct AppState {
    // ── Version tracking ────────────────────────────────────────────────
    /// Monotonically increasing version counter, bumped only when a new
    /// dashboard is published. The WebSocket feed polls it.
    pub state_version: AtomicU64,

    // ── Configuration ───────────────────────────────────────────────────
    /// Immutable for the lifetime of the process.
    pub config: EngineConfig,

    // ── Derived view ────────────────────────────────────────────────────
    dashboard: RwLock<Option<Arc<Dashboard>>>,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    // ── Timing ──────────────────────────────────────────────────────────
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state_version: AtomicU64::new(1),
            config,
            dashboard: RwLock::new(None),
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    // ── Version Management ──────────────────────────────────────────────

    /// Atomically increment the state version and return the previous one.
    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::SeqCst)
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::SeqCst)
    }

    // ── Dashboard ───────────────────────────────────────────────────────

    /// Replace the published dashboard with a freshly derived one.
    pub fn publish(&self, dashboard: Dashboard) {
        *self.dashboard.write() = Some(Arc::new(dashboard));
        self.increment_version();
    }

    /// Latest published dashboard, if any cycle has succeeded yet.
    pub fn dashboard(&self) -> Option<Arc<Dashboard>> {
        self.dashboard.read().clone()
    }

    // ── Error Logging ───────────────────────────────────────────────────

    /// Record an error message. The ring buffer is capped at
    /// [`MAX_RECENT_ERRORS`]; oldest entries are evicted first.
    ///
    /// The state version is left alone: the published dashboard did not
    /// change, so WebSocket clients have nothing new to receive.
    pub fn push_error(&self, msg: String) {
        let record = ErrorRecord {
            message: msg,
            at: Utc::now().to_rfc3339(),
        };

        let mut errors = self.recent_errors.write();
        errors.push(record);
        while errors.len() > MAX_RECENT_ERRORS {
            errors.remove(0);
        }
    }

    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.recent_errors.read().last().cloned()
    }

    // ── Health ──────────────────────────────────────────────────────────

    pub fn build_health(&self) -> HealthSnapshot {
        let dashboard = self.dashboard();
        let status = match &dashboard {
            Some(_) => "ok",
            None => "warming_up",
        };

        HealthSnapshot {
            status: status.to_string(),
            state_version: self.current_state_version(),
            server_time: Utc::now().timestamp_millis(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            symbol: self.config.symbol.clone(),
            last_cycle_id: dashboard.as_ref().map(|d| d.cycle_id),
            last_computed_at: dashboard.as_ref().map(|d| d.computed_at),
            last_error: self.last_error(),
        }
    }
}

// =============================================================================
// Health Snapshot
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub status: String,
    pub state_version: u64,
    /// Server time as epoch milliseconds.
    pub server_time: i64,
    pub uptime_secs: u64,
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_cycle_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_computed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorRecord>,
}
