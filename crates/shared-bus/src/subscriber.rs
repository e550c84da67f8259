//! # Queue Subscriber
//!
//! Defines the subscription side of the queue bus.

use crate::message::{QueueFilter, QueueMessage};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The queue bus was closed.
    #[error("Queue bus closed")]
    Closed,
}

/// A subscription handle for receiving messages.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<QueueMessage>,

    /// Filter for this subscription.
    filter: QueueFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Filter key for this subscription.
    filter_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<QueueMessage>,
        filter: QueueFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        filter_key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            subscriptions,
            filter_key,
        }
    }

    /// Receive the next message that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<QueueMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
            // Message is for another queue, continue waiting
        }
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available and matched
    /// - `Ok(None)` - No message available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<QueueMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
            // Message is for another queue, try again
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &QueueFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Decrement subscription count
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.filter_key) else {
            debug!(filter = %self.filter_key, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.filter_key);
        }
        debug!(filter = %self.filter_key, "Subscription dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::InMemoryQueueBus;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_subscription_recv() {
        let bus = InMemoryQueueBus::new();
        let mut sub = bus.subscribe(QueueFilter::all());

        bus.publish_to("sheet.process", r#"{"processId":"x"}"#).await;

        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");

        assert_eq!(received.queue, "sheet.process");
        assert_eq!(received.body, r#"{"processId":"x"}"#);
    }

    #[tokio::test]
    async fn test_subscription_filter() {
        let bus = InMemoryQueueBus::new();

        // Subscribe only to the result queue
        let mut sub = bus.subscribe(QueueFilter::queue("sheet.process.result"));

        // Publish a work message (should be filtered)
        bus.publish_to("sheet.process", "work").await;

        // Publish a result message (should be received)
        bus.publish_to("sheet.process.result", "result").await;

        // Should receive only the result message
        let received = timeout(Duration::from_millis(100), sub.recv())
            .await
            .expect("timeout")
            .expect("message");

        assert_eq!(received.body, "result");
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let bus = InMemoryQueueBus::new();

        {
            let _sub1 = bus.subscribe(QueueFilter::all());
            let _sub2 = bus.subscribe(QueueFilter::all());
            assert_eq!(bus.subscriber_count(), 2);
        }

        // After drop, count should be 0
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = InMemoryQueueBus::new();
        let mut sub = bus.subscribe(QueueFilter::all());

        // No messages published yet
        let result = sub.try_recv();
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_try_recv_message() {
        let bus = InMemoryQueueBus::new();
        let mut sub = bus.subscribe(QueueFilter::all());

        bus.publish_to("sheet.process", "work").await;

        // Should receive immediately
        let result = sub.try_recv();
        assert!(matches!(result, Ok(Some(m)) if m.body == "work"));
    }
}
