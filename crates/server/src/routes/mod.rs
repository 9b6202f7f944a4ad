//! API route handlers for the churnboard server.

pub mod health;
pub mod uploads;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router with all routes under /api prefix.
///
/// Routes:
/// - GET    /api/health - Health check with poller activity snapshot
/// - POST   /api/uploads/watch - Start tracking a batch of processing jobs
/// - GET    /api/uploads/active - Count of jobs currently being polled
/// - DELETE /api/uploads/watch - Stop tracking everything
/// - GET    /api/uploads/notifications - SSE stream of upload notifications
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", health::router())
        .nest("/api", uploads::router())
        .with_state(state)
}
