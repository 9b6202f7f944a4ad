// crates/server/src/routes/health.rs
//! Liveness endpoint for the dashboard API.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Payload for the liveness endpoint: process health plus a snapshot of
/// poller activity so operators can see at a glance whether uploads are
/// still being tracked.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Upload jobs the poller is currently tracking.
    pub tracked_uploads: usize,
}

/// GET /api/health — liveness check.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
        tracked_uploads: state.poller.job_count(),
    })
}

/// Build the health router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}
