// crates/uploads/src/lib.rs
//! Background upload-status polling for the churnboard dashboard.
//!
//! Server-side CSV processing is asynchronous: the backend accepts a file,
//! returns a job id, and works in the background. This crate owns the
//! process-wide manager that keeps checking those jobs after the submitting
//! page has navigated away, raises exactly one notification per terminal
//! outcome, and reports batch completion to interested subscribers.
//!
//! The two collaborators are traits: [`StatusClient`] for the backend's
//! status endpoint and [`Notifier`] for the toast/notification sink.

mod classify;
pub mod notify;
pub mod poller;
pub mod status;
pub mod types;

pub use notify::{BroadcastNotifier, Notification, Notifier, Severity};
pub use poller::{CompletionGuard, UploadPoller, INITIAL_DELAY, MAX_ATTEMPTS, POLL_INTERVAL};
pub use status::{HttpStatusClient, StatusClient, StatusError};
pub use types::{JobId, JobOutcome, ProcessingStatus, UploadJob, UploadStatus};
