//! Loopback worker simulator.
//!
//! Stands in for the real spreadsheet worker during development runs:
//! consumes the work queue and answers every order on the result queue with
//! a `done` outcome. Row counts are made up; the point is exercising the
//! correlation path, not the import.

use sheet_bridge::domain::extract_sheet_id;
use sheet_bridge::{JobSpec, WorkOrder, WorkOutcome};
use shared_bus::{InMemoryQueueBus, QueueFilter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Simulated processing latency per order.
const PROCESSING_DELAY: Duration = Duration::from_millis(50);

/// Consume the work queue and answer on the result queue.
pub async fn run(bus: Arc<InMemoryQueueBus>, work_queue: String, result_queue: String) {
    info!(queue = %work_queue, "Worker simulator consuming");

    let mut subscription = bus.subscribe(QueueFilter::queue(work_queue));

    while let Some(message) = subscription.recv().await {
        let order: WorkOrder = match serde_json::from_str(&message.body) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "Worker simulator dropping malformed order");
                continue;
            }
        };

        tokio::time::sleep(PROCESSING_DELAY).await;

        let sheet_id = match &order.job {
            JobSpec::RefreshSheet { sheet_id } => sheet_id.clone(),
            JobSpec::ProcessUrl { sheet_url } => {
                extract_sheet_id(sheet_url).unwrap_or_else(|_| sheet_url.clone())
            }
        };

        let outcome = WorkOutcome::done(order.process_id)
            .with_sheet_id(sheet_id.clone())
            .with_rows(sheet_id.len() as u32)
            .with_message("simulated import");

        match serde_json::to_string(&outcome) {
            Ok(raw) => {
                bus.publish_to(result_queue.clone(), raw).await;
            }
            Err(e) => warn!(error = %e, "Worker simulator failed to encode outcome"),
        }
    }

    warn!("Work queue closed, worker simulator stopping");
}
