//! Inbound work outcomes.
//!
//! Mirrors the worker's result document. Only `processId` is required; the
//! body fields depend on what the worker managed to do.

use crate::domain::correlation::CorrelationId;
use serde::{Deserialize, Serialize};

/// Envelope consumed from the result queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOutcome {
    /// Correlation id matching the work order.
    pub process_id: CorrelationId,

    /// Processing status reported by the worker (e.g. `done`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Human-readable status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Sheet the outcome refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,

    /// Number of rows processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_processed: Option<u32>,

    /// Number of columns processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns_processed: Option<u32>,

    /// Daily recap summary produced alongside the import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_recaps: Option<DailyRecap>,
}

impl WorkOutcome {
    /// An outcome with status `done` and an empty body.
    pub fn done(process_id: CorrelationId) -> Self {
        Self {
            process_id,
            status: Some("done".to_string()),
            message: None,
            sheet_id: None,
            rows_processed: None,
            columns_processed: None,
            daily_recaps: None,
        }
    }

    /// Set the processed row count.
    #[must_use]
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows_processed = Some(rows);
        self
    }

    /// Set the sheet id.
    #[must_use]
    pub fn with_sheet_id(mut self, sheet_id: impl Into<String>) -> Self {
        self.sheet_id = Some(sheet_id.into());
        self
    }

    /// Set the status message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Daily recap counts attached to an import outcome.
///
/// Field names match the worker's document verbatim (snake case on the
/// wire, unlike the envelope).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyRecap {
    /// Tasks still in the backlog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backlog_tasks: Option<u32>,
    /// Daily recap rows imported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_recaps: Option<u32>,
    /// Recap status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Project the recap belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Recap status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}
