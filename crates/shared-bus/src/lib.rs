//! # Shared Bus - Queue Bus for Worker Communication
//!
//! In-memory stand-in for the message broker that connects the backend to the
//! spreadsheet worker. Two logical channels exist: a work queue the backend
//! publishes to, and a result queue the worker answers on.
//!
//! ```text
//! ┌──────────────┐                      ┌──────────────┐
//! │   Backend    │   publish(work)      │    Worker    │
//! │              │ ──────┐              │              │
//! └──────────────┘       │              └──────────────┘
//!        ↑               ▼                  │      ↑
//!        │         ┌──────────────┐         │      │
//!        └──────── │  Queue Bus   │ ◄───────┘      │
//! subscribe(result)│              │   subscribe(work)
//!                  └──────────────┘
//! ```
//!
//! Queue names are plain strings; messages carry the serialized payloads that
//! would travel over the broker. Delivery is broadcast within the process, so
//! every subscriber of a queue sees every message published to it. A
//! distributed deployment would replace [`InMemoryQueueBus`] with a
//! broker-backed implementation of [`QueuePublisher`].

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use message::{QueueFilter, QueueMessage};
pub use publisher::{InMemoryQueueBus, QueuePublisher};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before lag kicks in.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
