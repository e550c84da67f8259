//! # Queue Messages
//!
//! The unit of exchange on the bus: a queue name plus an opaque body.

/// A message addressed to a named queue.
///
/// The body is the already-serialized payload; the bus never inspects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Destination queue name (e.g. `sheet.process`).
    pub queue: String,

    /// Serialized payload.
    pub body: String,
}

impl QueueMessage {
    /// Create a message for a queue.
    pub fn new(queue: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            body: body.into(),
        }
    }
}

/// Filter selecting which queues a subscription receives from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueFilter {
    /// Queue names to receive. Empty means every queue.
    pub queues: Vec<String>,
}

impl QueueFilter {
    /// Receive messages from every queue.
    #[must_use]
    pub fn all() -> Self {
        Self { queues: Vec::new() }
    }

    /// Receive messages from a single queue.
    #[must_use]
    pub fn queue(name: impl Into<String>) -> Self {
        Self {
            queues: vec![name.into()],
        }
    }

    /// Receive messages from several queues.
    #[must_use]
    pub fn queues(names: Vec<String>) -> Self {
        Self { queues: names }
    }

    /// Whether a message passes this filter.
    #[must_use]
    pub fn matches(&self, message: &QueueMessage) -> bool {
        self.queues.is_empty() || self.queues.iter().any(|q| q == &message.queue)
    }
}
