//! Bridge error types.
//!
//! Every core-local failure is returned as a typed error to the immediate
//! caller; nothing is retried silently inside the bridge. The HTTP layer is
//! expected to map `Timeout` to a request-timeout status rather than a
//! generic server error.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Work order could not be encoded before publish. Terminal; the waiter
    /// registered for the call has already been removed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No result arrived within the bound. The waiter is cleaned up; a
    /// late-arriving result lands only in the result cache.
    #[error("processing timeout - no result received within {0:?}")]
    Timeout(Duration),

    /// Publishing to the work queue failed. Not retried by the bridge.
    #[error("publish failed: {0}")]
    Publish(String),

    /// Sheet URL without an extractable sheet id.
    #[error("invalid sheet url: {0}")]
    InvalidSheetUrl(String),

    /// Refresh target has no catalog entry or no sheet id.
    #[error("project not found: {0}")]
    UnknownProject(i64),

    /// The project catalog could not be queried.
    #[error("catalog unavailable: {0}")]
    Catalog(String),

    /// Invalid configuration rejected at construction.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
