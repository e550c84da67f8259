//! Outbound work orders.
//!
//! The envelope field names are the wire contract with the worker: the
//! correlation id travels as `processId`, the job fields as `sheetUrl` /
//! `sheetId`.

use crate::domain::correlation::CorrelationId;
use serde::{Deserialize, Serialize};

/// Envelope published to the work queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    /// Correlation id for outcome matching.
    pub process_id: CorrelationId,
    /// Job payload, flattened into the envelope.
    #[serde(flatten)]
    pub job: JobSpec,
}

impl WorkOrder {
    /// Create an order carrying an already-generated correlation id.
    pub fn with_correlation_id(process_id: CorrelationId, job: JobSpec) -> Self {
        Self { process_id, job }
    }
}

/// What the worker is asked to do.
///
/// `ProcessUrl` carries the full spreadsheet URL (process-now requests);
/// `RefreshSheet` carries a bare sheet id resolved from the catalog
/// (refresh requests).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum JobSpec {
    /// Process a sheet by URL.
    ProcessUrl {
        /// Full spreadsheet URL.
        sheet_url: String,
    },
    /// Re-process a sheet by id.
    RefreshSheet {
        /// Bare sheet id.
        sheet_id: String,
    },
}

impl JobSpec {
    /// Job kind for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            JobSpec::ProcessUrl { .. } => "process-url",
            JobSpec::RefreshSheet { .. } => "refresh-sheet",
        }
    }
}
