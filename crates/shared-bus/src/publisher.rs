//! # Queue Publisher
//!
//! Defines the publishing side of the queue bus.

use crate::message::{QueueFilter, QueueMessage};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing messages to the bus.
///
/// This is the interface the backend uses to dispatch work orders; the
/// worker uses the same interface for results.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    /// Publish a message to its queue.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the message. Zero
    /// receivers is not an error: a broker accepts messages for queues
    /// without consumers.
    async fn publish(&self, message: QueueMessage) -> usize;

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the queue bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-process operation; distributed deployments
/// would use a broker-backed implementation instead.
pub struct InMemoryQueueBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<QueueMessage>,

    /// Active subscription count by queue filter.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryQueueBus {
    /// Create a new in-memory queue bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory queue bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages matching a filter.
    ///
    /// Returns a `Subscription` handle that can be used to receive messages.
    #[must_use]
    pub fn subscribe(&self, filter: QueueFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let filter_key = format!("{:?}", filter.queues);

        // Track subscription
        {
            if let Ok(mut subs) = self.subscriptions.write() {
                *subs.entry(filter_key.clone()).or_insert(0) += 1;
            }
        }

        debug!(queues = ?filter.queues, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), filter_key)
    }

    /// Publish a body to a named queue.
    ///
    /// Convenience over [`QueuePublisher::publish`].
    pub async fn publish_to(&self, queue: impl Into<String>, body: impl Into<String>) -> usize {
        self.publish(QueueMessage::new(queue, body)).await
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryQueueBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueuePublisher for InMemoryQueueBus {
    async fn publish(&self, message: QueueMessage) -> usize {
        let queue = message.queue.clone();

        // Always increment counter (publish was attempted)
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(
                    queue = %queue,
                    receivers = receiver_count,
                    "Message published"
                );
                receiver_count
            }
            Err(e) => {
                // No receivers - message is dropped
                warn!(
                    queue = %queue,
                    error = %e,
                    "Message dropped (no receivers)"
                );
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
