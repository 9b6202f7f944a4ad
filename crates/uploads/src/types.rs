// crates/uploads/src/types.rs
//! Types for the upload status tracking system.

use serde::Deserialize;

/// Unique identifier the backend assigns to a processing job at submission time.
pub type JobId = u64;

/// Processing state reported by the upload status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Success,
    Failed,
    /// Any status string outside the known set. Treated as a failure so the
    /// job cannot stay tracked forever.
    #[serde(other)]
    Unknown,
}

/// One response from the upload status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadStatus {
    pub processing_status: ProcessingStatus,
    #[serde(default)]
    pub row_count: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// One tracked asynchronous processing job.
#[derive(Debug, Clone)]
pub struct UploadJob {
    /// Dataset category label (which CSV kind this file represents).
    pub job_type: String,
    pub id: JobId,
    /// Most recent file name reported by the server, if any.
    pub display_name: Option<String>,
    /// Status checks performed so far; incremented once per poll tick.
    pub attempt_count: u32,
}

impl UploadJob {
    pub fn new(job_type: impl Into<String>, id: JobId) -> Self {
        Self {
            job_type: job_type.into(),
            id,
            display_name: None,
            attempt_count: 0,
        }
    }

    /// Human-readable label: the last server-supplied file name, falling
    /// back to the job type.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.job_type)
    }
}

/// Result of classifying one status check for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    pub job_id: JobId,
    /// True when the job reached a terminal state (success, failure, or
    /// timeout) and must be removed from tracking.
    pub completed: bool,
    /// True only for a successful completion.
    pub success: bool,
}
