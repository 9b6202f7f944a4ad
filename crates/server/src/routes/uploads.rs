// crates/server/src/routes/uploads.rs
//! API routes for upload status tracking.
//!
//! - POST   /uploads/watch — Submit a batch of (dataset kind → job id) pairs
//! - GET    /uploads/active — Diagnostic count of tracked jobs
//! - DELETE /uploads/watch — Stop tracking everything
//! - GET    /uploads/notifications — SSE stream of upload notifications

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use churnboard_uploads::JobId;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Response carrying the current number of tracked jobs.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ActiveResponse {
    pub active: usize,
}

/// POST /api/uploads/watch — Start polling a batch of processing jobs.
///
/// The body is a map of dataset kind to the job id the backend returned at
/// submission time, e.g. `{"receive": 101, "shipment": 102}`.
async fn watch_uploads(
    State(state): State<Arc<AppState>>,
    Json(jobs): Json<HashMap<String, JobId>>,
) -> ApiResult<(StatusCode, Json<ActiveResponse>)> {
    if jobs.is_empty() {
        return Err(ApiError::BadRequest("no upload jobs supplied".to_string()));
    }
    state.poller.add_jobs(jobs);
    Ok((
        StatusCode::ACCEPTED,
        Json(ActiveResponse {
            active: state.poller.job_count(),
        }),
    ))
}

/// GET /api/uploads/active — Count of jobs currently being polled.
async fn active_uploads(State(state): State<Arc<AppState>>) -> Json<ActiveResponse> {
    Json(ActiveResponse {
        active: state.poller.job_count(),
    })
}

/// DELETE /api/uploads/watch — Forcibly stop tracking all jobs.
async fn clear_uploads(State(state): State<Arc<AppState>>) -> StatusCode {
    state.poller.clear_all();
    StatusCode::NO_CONTENT
}

/// GET /api/uploads/notifications — SSE stream of upload notifications.
async fn stream_notifications(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.notifications_tx.subscribe();

    let stream = async_stream::stream! {
        let mut rx = rx;
        while let Ok(notification) = rx.recv().await {
            let json = serde_json::to_string(&notification).unwrap_or_default();
            yield Ok(Event::default().data(json));
        }
    };

    Sse::new(stream)
}

/// Build the uploads router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/uploads/watch", post(watch_uploads).delete(clear_uploads))
        .route("/uploads/active", get(active_uploads))
        .route("/uploads/notifications", get(stream_notifications))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_creation() {
        let _router = router();
    }

    #[test]
    fn active_response_serialization() {
        let json = serde_json::to_string(&ActiveResponse { active: 3 }).unwrap();
        assert_eq!(json, "{\"active\":3}");
    }
}
