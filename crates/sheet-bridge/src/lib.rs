//! Sheet-sync bridge - asynchronous worker correlation for the Opsboard backend.
//!
//! Task and progress data comes from spreadsheets parsed by an external
//! worker. The backend never calls that worker directly: it publishes a work
//! order to a queue and the worker answers on a result queue, some seconds
//! later, in no particular order. This crate turns that fire-and-forget
//! exchange into the two calling shapes the backend needs:
//!
//! - a bounded synchronous call (`process now` requests wait up to 30 s), and
//! - fire-and-forget plus later polling by correlation id (`refresh` requests).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        SHEET BRIDGE                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────────────┐      ┌──────────────────────────────┐    │
//! │  │  SheetSyncService │      │   Scheduled refresh task     │    │
//! │  │  process/refresh/ │      │   (all projects, periodic)   │    │
//! │  │  status           │      └──────────────┬───────────────┘    │
//! │  └─────────┬─────────┘                     │                    │
//! │            │                               │                    │
//! │  ┌─────────┴───────────────────────────────┴────────┐           │
//! │  │                  JobCorrelator                   │           │
//! │  │   PendingJobStore (oneshot waiters by id)        │           │
//! │  │   ResultCache     (last outcome by id)           │           │
//! │  └─────────┬────────────────────────────▲───────────┘           │
//! │            │ WorkOrder                  │ WorkOutcome           │
//! └────────────┼───────────────────────────┼───────────────────────┘
//!              ▼                            │
//!        work queue                   result queue
//!              │                            ▲
//!              └──────► spreadsheet worker ─┘
//! ```
//!
//! The correlation id travels on the wire as the `processId` field, the name
//! the worker expects. Within one process the queues are served by
//! `shared-bus`; a broker-backed transport plugs in behind the same
//! [`WorkSender`]/[`ResultReceiver`] traits.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;

// Re-exports for public API
pub use domain::config::{BridgeConfig, ConfigError};
pub use domain::correlation::CorrelationId;
pub use domain::error::{BridgeError, BridgeResult};
pub use domain::pending::PendingJobStore;
pub use domain::results::ResultCache;
pub use ipc::{
    JobCorrelator, JobSpec, ResultListener, ResultReceiver, TransportError, WorkOrder,
    WorkOutcome, WorkSender,
};
pub use ports::outbound::{CatalogError, InMemoryProjectCatalog, ProjectCatalog, ProjectSheet};
pub use service::SheetSyncService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
