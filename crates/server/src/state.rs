// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use churnboard_uploads::{BroadcastNotifier, Notification, StatusClient, UploadPoller};
use tokio::sync::broadcast;

/// Shared application state accessible from all route handlers.
///
/// This is the composition root for the upload poller: the status client and
/// notification channel are wired here once and the poller instance is shared
/// through the router state instead of living in a global.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Background upload-status poller.
    pub poller: Arc<UploadPoller>,
    /// Broadcast sender for notification SSE events.
    pub notifications_tx: broadcast::Sender<Notification>,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(client: Arc<dyn StatusClient>) -> Arc<Self> {
        let (notifications_tx, _) = broadcast::channel(256);
        let notifier = Arc::new(BroadcastNotifier::new(notifications_tx.clone()));
        Arc::new(Self {
            start_time: Instant::now(),
            poller: UploadPoller::new(client, notifier),
            notifications_tx,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use churnboard_uploads::HttpStatusClient;

    fn test_state() -> Arc<AppState> {
        // Points at a dead port; tests never let the poller reach a tick.
        AppState::new(Arc::new(HttpStatusClient::new("http://127.0.0.1:9/api")))
    }

    #[tokio::test]
    async fn new_state_starts_with_no_tracked_jobs() {
        let state = test_state();
        assert_eq!(state.poller.job_count(), 0);
        assert!(state.uptime_secs() < 5);
    }

    #[tokio::test]
    async fn notification_channel_accepts_subscribers() {
        let state = test_state();
        let rx = state.notifications_tx.subscribe();
        drop(rx);
    }
}
