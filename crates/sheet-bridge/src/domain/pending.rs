//! Pending job store - the waiter registry behind `submit_and_wait`.
//!
//! Maps correlation ids to the oneshot slots that submitting calls block on
//! until the worker's result arrives or the timeout fires.

use crate::domain::correlation::CorrelationId;
use crate::ipc::responses::WorkOutcome;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A pending job waiting for its outcome.
struct PendingJob {
    /// Channel to deliver the outcome.
    sender: oneshot::Sender<WorkOutcome>,
    /// When the job was registered.
    created_at: Instant,
    /// Job kind (for logging).
    kind: &'static str,
    /// Timeout for this job.
    timeout: Duration,
}

/// Counters for the pending job store.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total jobs registered.
    pub total_registered: AtomicU64,
    /// Total jobs completed by a result.
    pub total_completed: AtomicU64,
    /// Total jobs reclaimed by the expiry sweep.
    pub total_expired: AtomicU64,
    /// Total jobs cancelled (timeout or failed dispatch).
    pub total_cancelled: AtomicU64,
}

/// Registry of in-flight jobs.
///
/// Flow:
/// 1. The correlator calls `register()` and gets a fresh id plus a receiver.
/// 2. The work order is published carrying that id.
/// 3. The result listener calls `complete()` when the matching outcome lands.
/// 4. The correlator awaits the receiver under its timeout.
///
/// At most one entry exists per id. `complete()` removes and resolves in one
/// step, so a duplicate delivery finds nothing to resolve and becomes a no-op.
pub struct PendingJobStore {
    /// Map of correlation id to pending job.
    pending: DashMap<CorrelationId, PendingJob>,
    /// Default timeout.
    default_timeout: Duration,
    /// Counters.
    stats: Arc<PendingStats>,
}

impl PendingJobStore {
    /// Create a new pending job store.
    pub fn new(default_timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            default_timeout,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending job and get a receiver for the outcome.
    ///
    /// Returns the fresh correlation id and the receiver it will resolve.
    /// Registration happens before the order is published, so a result can
    /// never arrive with nobody listening.
    pub fn register(
        &self,
        kind: &'static str,
        timeout: Option<Duration>,
    ) -> (CorrelationId, oneshot::Receiver<WorkOutcome>) {
        let process_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        let job = PendingJob {
            sender: tx,
            created_at: Instant::now(),
            kind,
            timeout: timeout.unwrap_or(self.default_timeout),
        };

        self.pending.insert(process_id, job);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            process_id = %process_id,
            kind = kind,
            "Registered pending job"
        );

        (process_id, rx)
    }

    /// Complete a pending job with its outcome.
    ///
    /// Removal and resolution are one atomic step; the first delivery wins
    /// and later ones find nothing. Returns true if a waiter was resolved.
    pub fn complete(&self, process_id: CorrelationId, outcome: WorkOutcome) -> bool {
        if let Some((_, job)) = self.pending.remove(&process_id) {
            let waited = job.created_at.elapsed();

            match job.sender.send(outcome) {
                Ok(()) => {
                    self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        process_id = %process_id,
                        kind = job.kind,
                        waited_ms = waited.as_millis(),
                        "Completed pending job"
                    );
                    true
                }
                Err(_) => {
                    // Receiver was dropped (caller gave up)
                    self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        process_id = %process_id,
                        kind = job.kind,
                        "Pending job receiver dropped"
                    );
                    false
                }
            }
        } else {
            // Already timed out, or a duplicate delivery. Normal.
            debug!(
                process_id = %process_id,
                "Outcome for unknown or expired correlation id"
            );
            false
        }
    }

    /// Cancel a pending job (timeout or failed dispatch).
    pub fn cancel(&self, process_id: &CorrelationId) -> bool {
        if self.pending.remove(process_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Remove entries whose callers never came back to collect them.
    ///
    /// The timeout path in the correlator already removes its own entry;
    /// this sweep reclaims entries left behind by callers that were dropped
    /// mid-wait. Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.pending.retain(|id, job| {
            let elapsed = now.duration_since(job.created_at);
            if elapsed > job.timeout {
                warn!(
                    process_id = %id,
                    kind = job.kind,
                    elapsed_ms = elapsed.as_millis(),
                    timeout_ms = job.timeout.as_millis(),
                    "Reclaiming expired pending job"
                );
                self.stats.total_expired.fetch_add(1, Ordering::Relaxed);
                removed += 1;
                false // Remove
            } else {
                true // Keep
            }
        });

        removed
    }

    /// Number of currently pending jobs.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check whether a correlation id is pending.
    pub fn is_pending(&self, process_id: &CorrelationId) -> bool {
        self.pending.contains_key(process_id)
    }

    /// Get counters.
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Background task sweeping expired entries.
pub async fn cleanup_task(store: Arc<PendingJobStore>, interval: Duration) {
    let mut sweep = tokio::time::interval(interval);
    sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep.tick().await;
        let removed = store.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Swept expired pending jobs");
        }
    }
}
