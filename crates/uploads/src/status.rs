// crates/uploads/src/status.rs
//! StatusClient trait and the HTTP implementation against the dashboard
//! backend's upload status endpoint.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{JobId, UploadStatus};

/// Errors from a single status check. All variants are transient from the
/// poller's point of view: the job is retried until its attempt budget runs
/// out.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("status request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Trait for fetching the processing state of one upload job.
///
/// The production implementation is [`HttpStatusClient`]; tests substitute
/// scripted fakes so ticks can be driven deterministically.
#[async_trait]
pub trait StatusClient: Send + Sync {
    async fn fetch_status(&self, job_id: JobId) -> Result<UploadStatus, StatusError>;
}

/// StatusClient backed by the backend's `GET /uploads/{id}/status` endpoint.
pub struct HttpStatusClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatusClient {
    /// Create a client for the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl StatusClient for HttpStatusClient {
    async fn fetch_status(&self, job_id: JobId) -> Result<UploadStatus, StatusError> {
        let url = format!("{}/uploads/{}/status", self.base_url, job_id);
        let status = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<UploadStatus>()
            .await?;
        Ok(status)
    }
}
