// crates/uploads/src/poller.rs
//! Process-wide upload status poller.
//!
//! Tracks asynchronous server-side file-processing jobs across page
//! navigations, polls their status on a fixed schedule, classifies each
//! response, raises one notification per terminal outcome, and tells
//! completion subscribers when a submitted batch has fully resolved.
//!
//! The loop is lazy: it starts on the first [`UploadPoller::add_jobs`] call
//! and stops on its own once the registry drains. Within one tick all status
//! checks run concurrently; the next tick is only scheduled after the current
//! one resolves, so there is never more than one tick in flight.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::Duration;

use crate::classify::classify;
use crate::notify::Notifier;
use crate::status::StatusClient;
use crate::types::{JobId, UploadJob};

/// Delay between poll ticks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Delay before the first check after the loop starts.
pub const INITIAL_DELAY: Duration = Duration::from_secs(3);

/// Status checks per job before it is classified as timed out (~120s).
pub const MAX_ATTEMPTS: u32 = 40;

type CompletionCallback = Arc<dyn Fn(&[JobId], bool) + Send + Sync>;

struct Subscriber {
    id: u64,
    callback: CompletionCallback,
}

/// Registry and scheduler state. The run flag lives under the same lock as
/// the job map so an `add_jobs` racing a draining tick cannot leave jobs
/// unpolled.
struct Inner {
    jobs: HashMap<JobId, UploadJob>,
    /// Ids from the most recent `add_jobs` call still being tracked for a
    /// completion callback. Cleared once the batch completes.
    current_batch: Vec<JobId>,
    /// Whether any current-batch job has failed or timed out so far.
    batch_failed: bool,
    running: bool,
    loop_task: Option<JoinHandle<()>>,
}

/// Background upload-status polling manager.
///
/// Construct once at the composition root and share via `Arc`; route
/// handlers call [`add_jobs`](Self::add_jobs) and interested UI subscribes
/// with [`on_completion`](Self::on_completion).
pub struct UploadPoller {
    inner: Mutex<Inner>,
    subscribers: Arc<Mutex<Vec<Subscriber>>>,
    next_subscriber_id: AtomicU64,
    client: Arc<dyn StatusClient>,
    notifier: Arc<dyn Notifier>,
}

impl UploadPoller {
    pub fn new(client: Arc<dyn StatusClient>, notifier: Arc<dyn Notifier>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                jobs: HashMap::new(),
                current_batch: Vec::new(),
                batch_failed: false,
                running: false,
                loop_task: None,
            }),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscriber_id: AtomicU64::new(1),
            client,
            notifier,
        })
    }

    /// Start tracking a batch of (job type, job id) pairs.
    ///
    /// Ids already in flight are left untouched (attempt counts are not
    /// reset). The newly inserted ids become the current batch, replacing
    /// whatever batch was current before. Starts the poll loop if idle.
    /// Never fails; all outcomes are reported through notifications.
    pub fn add_jobs(self: &Arc<Self>, jobs: impl IntoIterator<Item = (String, JobId)>) {
        let mut inner = self.lock_inner();
        let mut batch = Vec::new();
        for (job_type, id) in jobs {
            if inner.jobs.contains_key(&id) {
                // Re-submitting an in-flight id is a no-op for that id.
                continue;
            }
            inner.jobs.insert(id, UploadJob::new(job_type, id));
            batch.push(id);
        }
        if !batch.is_empty() {
            tracing::info!(jobs = batch.len(), "tracking new upload batch");
        }
        inner.current_batch = batch;
        inner.batch_failed = false;

        if !inner.jobs.is_empty() && !inner.running {
            inner.running = true;
            inner.loop_task = Some(self.spawn_loop());
        }
    }

    /// Register a callback invoked when the current batch fully resolves.
    ///
    /// Receives the batch's job ids and whether every one of them succeeded.
    /// Callbacks run synchronously in registration order on the tick that
    /// drains the batch. The returned guard removes the subscription.
    pub fn on_completion<F>(&self, callback: F) -> CompletionGuard
    where
        F: Fn(&[JobId], bool) + Send + Sync + 'static,
    {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        lock_unpoisoned(&self.subscribers).push(Subscriber {
            id,
            callback: Arc::new(callback),
        });
        CompletionGuard {
            id,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Forcibly stop tracking everything and halt the loop.
    ///
    /// Administrative operation: raises no notifications and fires no
    /// completion callbacks, unlike a timeout.
    pub fn clear_all(&self) {
        let task = {
            let mut inner = self.lock_inner();
            inner.jobs.clear();
            inner.current_batch.clear();
            inner.batch_failed = false;
            inner.running = false;
            inner.loop_task.take()
        };
        if let Some(task) = task {
            task.abort();
            tracing::info!("upload polling cleared");
        }
    }

    /// Number of jobs currently tracked (diagnostic).
    pub fn job_count(&self) -> usize {
        self.lock_inner().jobs.len()
    }

    fn spawn_loop(self: &Arc<Self>) -> JoinHandle<()> {
        let poller = Arc::clone(self);
        tokio::spawn(async move {
            tracing::debug!("upload poll loop started");
            tokio::time::sleep(INITIAL_DELAY).await;
            while poller.check_all().await {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            tracing::debug!("upload poll loop stopped");
        })
    }

    /// One tick. Returns false when the registry drained and the loop
    /// should stop.
    async fn check_all(&self) -> bool {
        // Snapshot ids under the lock; a job added mid-tick is simply picked
        // up by the next snapshot.
        let ids: Vec<JobId> = {
            let mut inner = self.lock_inner();
            if inner.jobs.is_empty() {
                inner.running = false;
                inner.loop_task = None;
                return false;
            }
            inner.jobs.keys().copied().collect()
        };

        // Fan out one status check per job. A slow or failed check must not
        // delay the others, so fire everything and then await the lot.
        let fetches = ids.iter().map(|&id| {
            let client = Arc::clone(&self.client);
            async move { (id, client.fetch_status(id).await) }
        });
        let results = join_all(fetches).await;

        let mut notifications = Vec::new();
        let mut completed_batch = None;

        let keep_going = {
            let mut inner = self.lock_inner();
            for (id, result) in results {
                let Some(job) = inner.jobs.get_mut(&id) else {
                    // Removed while the check was in flight (clear_all).
                    continue;
                };
                job.attempt_count += 1;
                match &result {
                    Ok(status) => {
                        if let Some(name) = &status.file_name {
                            job.display_name = Some(name.clone());
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            job_id = id,
                            attempt = job.attempt_count,
                            error = %e,
                            "upload status check failed"
                        );
                    }
                }

                let classification = classify(job, &result);
                if classification.outcome.completed {
                    inner.jobs.remove(&id);
                    if !classification.outcome.success && inner.current_batch.contains(&id) {
                        inner.batch_failed = true;
                    }
                    if let Some(notification) = classification.notification {
                        notifications.push(notification);
                    }
                }
            }

            // A batch is complete exactly when none of its ids remain tracked.
            if !inner.current_batch.is_empty()
                && inner
                    .current_batch
                    .iter()
                    .all(|id| !inner.jobs.contains_key(id))
            {
                let batch = std::mem::take(&mut inner.current_batch);
                let all_success = !inner.batch_failed;
                inner.batch_failed = false;
                completed_batch = Some((batch, all_success));
            }

            if inner.jobs.is_empty() {
                inner.running = false;
                inner.loop_task = None;
                false
            } else {
                true
            }
        };

        // Side effects happen outside the lock so a subscriber or notifier
        // may call back into the poller.
        for notification in notifications {
            self.notifier.notify(notification);
        }
        if let Some((batch, all_success)) = completed_batch {
            self.dispatch_completion(&batch, all_success);
        }

        keep_going
    }

    fn dispatch_completion(&self, job_ids: &[JobId], all_success: bool) {
        tracing::info!(jobs = job_ids.len(), all_success, "upload batch complete");
        let callbacks: Vec<(u64, CompletionCallback)> = lock_unpoisoned(&self.subscribers)
            .iter()
            .map(|s| (s.id, Arc::clone(&s.callback)))
            .collect();
        for (id, callback) in callbacks {
            // One misbehaving subscriber must not suppress delivery to the rest.
            if catch_unwind(AssertUnwindSafe(|| callback(job_ids, all_success))).is_err() {
                tracing::error!(subscriber = id, "completion subscriber panicked");
            }
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by [`UploadPoller::on_completion`]; consuming it removes
/// the subscription. Dropping the guard without calling
/// [`unsubscribe`](Self::unsubscribe) leaves the subscription registered.
pub struct CompletionGuard {
    id: u64,
    subscribers: Weak<Mutex<Vec<Subscriber>>>,
}

impl CompletionGuard {
    pub fn unsubscribe(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            lock_unpoisoned(&subscribers).retain(|s| s.id != self.id);
        }
    }
}
