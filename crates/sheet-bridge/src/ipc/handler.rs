//! The correlator and the result listener.
//!
//! `JobCorrelator` turns the fire-and-forget queue exchange into a bounded
//! synchronous call; `ResultListener` consumes the result queue and wakes
//! the matching waiter, if one still exists.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::pending::PendingJobStore;
use crate::domain::results::ResultCache;
use crate::ipc::requests::{JobSpec, WorkOrder};
use crate::ipc::responses::WorkOutcome;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

/// Transport trait for publishing serialized work orders.
#[async_trait]
pub trait WorkSender: Send + Sync {
    /// Publish an already-serialized order to the work queue.
    async fn send(&self, raw: String) -> Result<(), TransportError>;
}

/// Transport trait for consuming raw result messages.
#[async_trait]
pub trait ResultReceiver: Send + Sync {
    /// Receive the next raw message (blocks until available).
    async fn receive(&self) -> Result<String, TransportError>;
}

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("receive failed: {0}")]
    ReceiveFailed(String),
}

/// Correlates work orders with their asynchronous outcomes.
pub struct JobCorrelator {
    /// Waiter registry.
    pending: Arc<PendingJobStore>,
    /// Last outcome per id, for post-hoc polling.
    results: Arc<ResultCache>,
    /// Transport for outgoing orders.
    sender: Arc<dyn WorkSender>,
    /// Default bound on synchronous calls.
    default_timeout: Duration,
}

impl JobCorrelator {
    pub fn new(
        pending: Arc<PendingJobStore>,
        results: Arc<ResultCache>,
        sender: Arc<dyn WorkSender>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            pending,
            results,
            sender,
            default_timeout,
        }
    }

    /// Dispatch a job and wait for its outcome.
    ///
    /// Exactly one terminal result per call: the worker's outcome, a
    /// `Timeout`, or a dispatch failure. Never leaves an entry behind in
    /// the waiter registry.
    pub async fn submit_and_wait(
        &self,
        job: JobSpec,
        timeout: Option<Duration>,
    ) -> BridgeResult<WorkOutcome> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let kind = job.kind();

        // Register before publishing, so a fast worker cannot answer while
        // nobody is listening.
        let (process_id, rx) = self.pending.register(kind, Some(timeout));

        let order = WorkOrder::with_correlation_id(process_id, job);
        let raw = match serde_json::to_string(&order) {
            Ok(raw) => raw,
            Err(e) => {
                self.pending.cancel(&process_id);
                return Err(BridgeError::Serialization(e));
            }
        };

        if let Err(e) = self.sender.send(raw).await {
            self.pending.cancel(&process_id);
            return Err(BridgeError::Publish(e.to_string()));
        }

        debug!(
            process_id = %process_id,
            kind = kind,
            timeout_ms = timeout.as_millis(),
            "Dispatched work order"
        );

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => {
                // Sender dropped without resolving: the sweep reclaimed the
                // entry. Indistinguishable from a timeout for the caller.
                Err(BridgeError::Timeout(timeout))
            }
            Err(_) => {
                // Best effort; a racing result lands only in the cache.
                self.pending.cancel(&process_id);
                Err(BridgeError::Timeout(timeout))
            }
        }
    }

    /// Dispatch a job without waiting.
    ///
    /// Returns the generated correlation id; the outcome can later be polled
    /// via [`cached_result`](Self::cached_result).
    pub async fn fire_and_forget(&self, job: JobSpec) -> BridgeResult<CorrelationId> {
        let process_id = CorrelationId::new();
        let kind = job.kind();

        let order = WorkOrder::with_correlation_id(process_id, job);
        let raw = serde_json::to_string(&order)?;

        self.sender
            .send(raw)
            .await
            .map_err(|e| BridgeError::Publish(e.to_string()))?;

        debug!(process_id = %process_id, kind = kind, "Dispatched work order (no wait)");
        Ok(process_id)
    }

    /// Look up the cached outcome for a correlation id.
    pub fn cached_result(&self, process_id: &CorrelationId) -> Option<WorkOutcome> {
        self.results.get(process_id)
    }

    /// Number of in-flight jobs.
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }
}

/// Consumes the result queue and resolves waiters.
pub struct ResultListener {
    pending: Arc<PendingJobStore>,
    results: Arc<ResultCache>,
    receiver: Arc<dyn ResultReceiver>,
}

impl ResultListener {
    pub fn new(
        pending: Arc<PendingJobStore>,
        results: Arc<ResultCache>,
        receiver: Arc<dyn ResultReceiver>,
    ) -> Self {
        Self {
            pending,
            results,
            receiver,
        }
    }

    /// Run the listener loop.
    pub async fn run(self) {
        loop {
            match self.receiver.receive().await {
                Ok(raw) => {
                    self.handle_raw(&raw);
                }
                Err(TransportError::ChannelClosed) => {
                    warn!("Result receiver channel closed, stopping listener");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving result message");
                }
            }
        }
    }

    /// Process one raw message from the result queue.
    ///
    /// A malformed message is logged and dropped; it must not take down the
    /// loop. Well-formed outcomes are cached unconditionally, then the
    /// waiter (if any) is resolved exactly once.
    pub fn handle_raw(&self, raw: &str) {
        let outcome: WorkOutcome = match serde_json::from_str(raw) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Dropping malformed result message");
                return;
            }
        };

        let process_id = outcome.process_id;

        // Cache first, so a status poll sees the outcome even when the
        // waiter is already gone.
        self.results.store(outcome.clone());

        if self.pending.complete(process_id, outcome) {
            debug!(process_id = %process_id, "Resolved pending job");
        }
    }
}

/// In-memory transport for testing.
pub mod channel {
    use super::*;

    pub struct ChannelWorkSender(pub mpsc::Sender<String>);
    pub struct ChannelResultReceiver(pub tokio::sync::Mutex<mpsc::Receiver<String>>);

    #[async_trait]
    impl WorkSender for ChannelWorkSender {
        async fn send(&self, raw: String) -> Result<(), TransportError> {
            self.0.send(raw).await.map_err(|_| TransportError::ChannelClosed)
        }
    }

    #[async_trait]
    impl ResultReceiver for ChannelResultReceiver {
        async fn receive(&self) -> Result<String, TransportError> {
            let mut guard = self.0.lock().await;
            guard.recv().await.ok_or(TransportError::ChannelClosed)
        }
    }

    /// Create a test transport pair.
    pub fn create_test_channel(
        buffer: usize,
    ) -> (
        ChannelWorkSender,
        mpsc::Receiver<String>,
        mpsc::Sender<String>,
        ChannelResultReceiver,
    ) {
        let (work_tx, work_rx) = mpsc::channel(buffer);
        let (result_tx, result_rx) = mpsc::channel(buffer);
        (
            ChannelWorkSender(work_tx),
            work_rx,
            result_tx,
            ChannelResultReceiver(tokio::sync::Mutex::new(result_rx)),
        )
    }
}
