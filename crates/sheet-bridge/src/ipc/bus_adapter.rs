//! Queue bus adapter.
//!
//! Implements [`WorkSender`]/[`ResultReceiver`] over `shared-bus` for
//! single-process operation. A broker-backed deployment would supply its own
//! implementations of the same traits.

use crate::ipc::handler::{ResultReceiver, TransportError, WorkSender};
use async_trait::async_trait;
use shared_bus::{InMemoryQueueBus, QueueFilter};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Publishes work orders to the configured work queue.
pub struct QueueWorkSender {
    /// Reference to the queue bus.
    bus: Arc<InMemoryQueueBus>,
    /// Work queue name.
    queue: String,
}

impl QueueWorkSender {
    pub fn new(bus: Arc<InMemoryQueueBus>, queue: impl Into<String>) -> Self {
        Self {
            bus,
            queue: queue.into(),
        }
    }
}

#[async_trait]
impl WorkSender for QueueWorkSender {
    async fn send(&self, raw: String) -> Result<(), TransportError> {
        let receivers = self.bus.publish_to(self.queue.clone(), raw).await;

        if receivers == 0 {
            // A broker would buffer the message; the in-memory bus drops it.
            // Either way the publish itself succeeded.
            warn!(
                queue = %self.queue,
                "No consumers on work queue (worker may not be running)"
            );
        } else {
            debug!(
                queue = %self.queue,
                receivers = receivers,
                "Work order delivered to {} consumer(s)",
                receivers
            );
        }

        Ok(())
    }
}

/// Receives raw result messages forwarded by the [`ResultRouter`].
pub struct QueueResultReceiver {
    /// Channel fed by the router.
    raw_rx: Mutex<mpsc::Receiver<String>>,
}

impl QueueResultReceiver {
    pub fn new(raw_rx: mpsc::Receiver<String>) -> Self {
        Self {
            raw_rx: Mutex::new(raw_rx),
        }
    }
}

#[async_trait]
impl ResultReceiver for QueueResultReceiver {
    async fn receive(&self) -> Result<String, TransportError> {
        let mut rx = self.raw_rx.lock().await;
        rx.recv().await.ok_or(TransportError::ChannelClosed)
    }
}

/// Routes messages from the result queue to the listener.
///
/// Subscribes to the configured result queue and forwards every body to the
/// channel behind [`QueueResultReceiver`]. Spawn as a background task.
pub struct ResultRouter {
    bus: Arc<InMemoryQueueBus>,
    queue: String,
    raw_tx: mpsc::Sender<String>,
}

impl ResultRouter {
    pub fn new(
        bus: Arc<InMemoryQueueBus>,
        queue: impl Into<String>,
        raw_tx: mpsc::Sender<String>,
    ) -> Self {
        Self {
            bus,
            queue: queue.into(),
            raw_tx,
        }
    }

    /// Run the routing loop until the bus or the listener goes away.
    pub async fn run(self) {
        info!(queue = %self.queue, "Result router listening");

        let mut subscription = self.bus.subscribe(QueueFilter::queue(self.queue.clone()));

        loop {
            match subscription.recv().await {
                Some(message) => {
                    if self.raw_tx.send(message.body).await.is_err() {
                        warn!("Result channel closed, stopping router");
                        break;
                    }
                }
                None => {
                    warn!("Queue bus closed, result router shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_sender_publishes_to_work_queue() {
        let bus = Arc::new(InMemoryQueueBus::new());
        let mut sub = bus.subscribe(QueueFilter::queue("sheet.process"));

        let sender = QueueWorkSender::new(bus, "sheet.process");
        sender.send(r#"{"processId":"x"}"#.into()).await.unwrap();

        let message = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");
        assert_eq!(message.body, r#"{"processId":"x"}"#);
    }

    #[tokio::test]
    async fn test_sender_tolerates_no_consumers() {
        let bus = Arc::new(InMemoryQueueBus::new());
        let sender = QueueWorkSender::new(bus, "sheet.process");

        // No subscriber: publish still succeeds
        assert!(sender.send("{}".into()).await.is_ok());
    }

    #[tokio::test]
    async fn test_router_forwards_result_bodies() {
        let bus = Arc::new(InMemoryQueueBus::new());
        let (raw_tx, raw_rx) = mpsc::channel(8);

        let router = ResultRouter::new(bus.clone(), "sheet.process.result", raw_tx);
        tokio::spawn(router.run());

        // Give the router a moment to subscribe
        tokio::time::sleep(Duration::from_millis(10)).await;

        bus.publish_to("sheet.process", "work, not a result").await;
        bus.publish_to("sheet.process.result", "the result").await;

        let receiver = QueueResultReceiver::new(raw_rx);
        let raw = timeout(Duration::from_millis(200), receiver.receive())
            .await
            .expect("timeout")
            .expect("raw");

        // Only the result queue message came through
        assert_eq!(raw, "the result");
    }
}
