// crates/uploads/src/classify.rs
//! Per-job status classification.
//!
//! Turns one status-check result into continue/success/failure/timeout and
//! builds the single notification raised at the moment of terminal
//! classification. The caller (the scheduler tick) has already incremented
//! the job's attempt count and folded any server-supplied file name into its
//! display name.

use crate::notify::Notification;
use crate::poller::MAX_ATTEMPTS;
use crate::status::StatusError;
use crate::types::{JobOutcome, ProcessingStatus, UploadJob, UploadStatus};

/// Outcome of one classification, plus the notification to raise when the
/// job terminated.
#[derive(Debug)]
pub(crate) struct Classification {
    pub outcome: JobOutcome,
    /// Present exactly when `outcome.completed` is true.
    pub notification: Option<Notification>,
}

impl Classification {
    fn keep_polling(job: &UploadJob) -> Self {
        Self {
            outcome: JobOutcome {
                job_id: job.id,
                completed: false,
                success: false,
            },
            notification: None,
        }
    }

    fn terminal(job: &UploadJob, success: bool, notification: Notification) -> Self {
        Self {
            outcome: JobOutcome {
                job_id: job.id,
                completed: true,
                success,
            },
            notification: Some(notification),
        }
    }
}

pub(crate) fn classify(
    job: &UploadJob,
    result: &Result<UploadStatus, StatusError>,
) -> Classification {
    let label = job.label();
    match result {
        Ok(status) => match status.processing_status {
            ProcessingStatus::Success => {
                let message = match status.row_count {
                    Some(rows) => {
                        format!("{label} processed successfully ({rows} rows imported).")
                    }
                    None => format!("{label} processed successfully."),
                };
                Classification::terminal(job, true, Notification::success("Upload complete", message))
            }
            ProcessingStatus::Failed => {
                let message = status
                    .error_message
                    .clone()
                    .unwrap_or_else(|| format!("{label} could not be processed."));
                Classification::terminal(job, false, Notification::error("Upload failed", message))
            }
            ProcessingStatus::Pending | ProcessingStatus::Processing => {
                if job.attempt_count >= MAX_ATTEMPTS {
                    let message = format!(
                        "{label} is taking longer than expected. \
                         Check the upload history for the final status."
                    );
                    Classification::terminal(
                        job,
                        false,
                        Notification::warning("Upload still processing", message),
                    )
                } else {
                    Classification::keep_polling(job)
                }
            }
            // An out-of-contract status cannot be confirmed either way; same
            // notification as an exhausted status-check budget.
            ProcessingStatus::Unknown => {
                Classification::terminal(job, false, could_not_confirm(label))
            }
        },
        // A failed status check is transient until the attempt budget runs out.
        Err(_) => {
            if job.attempt_count >= MAX_ATTEMPTS {
                Classification::terminal(job, false, could_not_confirm(label))
            } else {
                Classification::keep_polling(job)
            }
        }
    }
}

/// Persistent error raised when a job's state cannot be determined: the
/// status endpoint kept failing until the attempt budget ran out, or it
/// answered with a status outside the known set.
fn could_not_confirm(label: &str) -> Notification {
    let message = format!(
        "Could not confirm the status of {label}. \
         Check the upload history for the final result."
    );
    Notification::error("Upload status unavailable", message)
}
