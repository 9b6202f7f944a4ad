// crates/uploads/src/notify.rs
//! Notification sink for terminal upload outcomes.
//!
//! The poller raises exactly one [`Notification`] per job, at the moment the
//! job leaves the registry. The production sink is [`BroadcastNotifier`],
//! which publishes on a `tokio::sync::broadcast` channel consumed by the SSE
//! route; the UI renders each event as a toast.

use serde::Serialize;
use tokio::sync::broadcast;

/// How long a success toast stays visible before auto-dismissing.
pub const SUCCESS_DISMISS_MS: u32 = 5_000;

/// Duration value meaning "persist until the user dismisses manually".
pub const PERSIST_MS: u32 = 0;

/// Visual severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// One user-facing notification event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Auto-dismiss delay in milliseconds; 0 means persist until manually
    /// dismissed.
    pub duration_ms: u32,
    pub timestamp: String,
}

impl Notification {
    fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>, duration_ms: u32) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            duration_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Auto-dismissing success toast.
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message, SUCCESS_DISMISS_MS)
    }

    /// Persistent warning toast.
    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message, PERSIST_MS)
    }

    /// Persistent error toast.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message, PERSIST_MS)
    }
}

/// Sink the poller pushes terminal-outcome notifications into.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that fans notifications out over a broadcast channel.
pub struct BroadcastNotifier {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(tx: broadcast::Sender<Notification>) -> Self {
        Self { tx }
    }

    /// Subscribe to the notification stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notification: Notification) {
        // Ignore send errors (no subscribers is fine).
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_durations() {
        let n = Notification::success("Upload complete", "done");
        assert_eq!(n.severity, Severity::Success);
        assert_eq!(n.duration_ms, SUCCESS_DISMISS_MS);

        let n = Notification::warning("Still processing", "hang on");
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.duration_ms, PERSIST_MS);

        let n = Notification::error("Upload failed", "bad header");
        assert_eq!(n.severity, Severity::Error);
        assert_eq!(n.duration_ms, PERSIST_MS);
    }

    #[test]
    fn serializes_camel_case() {
        let n = Notification::error("Upload failed", "bad header");
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"durationMs\":0"));
        assert!(json.contains("\"timestamp\""));
    }

    #[tokio::test]
    async fn broadcast_notifier_delivers_to_subscribers() {
        let (tx, _) = broadcast::channel(8);
        let notifier = BroadcastNotifier::new(tx);
        let mut rx = notifier.subscribe();

        notifier.notify(Notification::success("Upload complete", "500 rows"));

        let received = rx.recv().await.unwrap();
        assert_eq!(received.title, "Upload complete");
    }

    #[test]
    fn notify_without_subscribers_does_not_panic() {
        let (tx, _) = broadcast::channel(8);
        let notifier = BroadcastNotifier::new(tx);
        notifier.notify(Notification::warning("Still processing", "..."));
    }
}
