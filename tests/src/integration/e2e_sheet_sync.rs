//! # End-to-End Sheet Sync Tests
//!
//! Tests the complete ingest choreography over the queue bus:
//!
//! ```text
//! [SheetSyncService] ──WorkOrder──→ [work queue]
//!                                        │
//!                                        ▼
//!                                 [echo worker]
//!                                        │
//!                                        ▼
//! [ResultListener] ◄──ResultRouter── [result queue]
//!        │
//!        ├── resolves the waiter (process-now calls)
//!        └── fills the result cache (refresh + poll)
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy path**: process-now returns the worker's outcome
//! 2. **Timeout handling**: no worker, bounded failure, clean registry
//! 3. **Refresh + poll**: fire-and-forget then status lookup
//! 4. **Resilience**: garbage on the result queue, out-of-order answers

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::sync::mpsc;
    use tokio::time::timeout;

    use shared_bus::{InMemoryQueueBus, QueueFilter};

    use sheet_bridge::ipc::{QueueResultReceiver, QueueWorkSender, ResultRouter};
    use sheet_bridge::{
        BridgeConfig, BridgeError, InMemoryProjectCatalog, JobSpec, ProjectSheet, ResultListener,
        SheetSyncService, WorkOrder, WorkOutcome,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    const WORK_QUEUE: &str = "sheet.process";
    const RESULT_QUEUE: &str = "sheet.process.result";

    fn sample_catalog() -> Arc<InMemoryProjectCatalog> {
        Arc::new(InMemoryProjectCatalog::new(vec![
            ProjectSheet {
                id: 1,
                name: "alpha".into(),
                sheet_id: Some("SHEET_A".into()),
            },
            ProjectSheet {
                id: 2,
                name: "beta".into(),
                sheet_id: None,
            },
            ProjectSheet {
                id: 3,
                name: "gamma".into(),
                sheet_id: Some("SHEET_G".into()),
            },
        ]))
    }

    /// Build the full wiring: bus, service, router, listener.
    fn spawn_harness(config: BridgeConfig) -> (Arc<InMemoryQueueBus>, Arc<SheetSyncService>) {
        let bus = Arc::new(InMemoryQueueBus::new());
        let sender = Arc::new(QueueWorkSender::new(Arc::clone(&bus), WORK_QUEUE));
        let service =
            Arc::new(SheetSyncService::new(config, sender, sample_catalog()).expect("service"));

        let (raw_tx, raw_rx) = mpsc::channel(64);
        let router = ResultRouter::new(Arc::clone(&bus), RESULT_QUEUE, raw_tx);
        tokio::spawn(router.run());

        let listener = ResultListener::new(
            service.pending_store(),
            service.result_cache(),
            Arc::new(QueueResultReceiver::new(raw_rx)),
        );
        tokio::spawn(listener.run());

        (bus, service)
    }

    /// Echo worker answering every order after `delay` with `done` + 42 rows.
    fn spawn_echo_worker(bus: Arc<InMemoryQueueBus>, delay: Duration) {
        tokio::spawn(async move {
            let mut orders = bus.subscribe(QueueFilter::queue(WORK_QUEUE));
            while let Some(message) = orders.recv().await {
                let Ok(order) = serde_json::from_str::<WorkOrder>(&message.body) else {
                    continue;
                };
                let bus = Arc::clone(&bus);
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let sheet_id = match &order.job {
                        JobSpec::RefreshSheet { sheet_id } => sheet_id.clone(),
                        JobSpec::ProcessUrl { sheet_url } => sheet_url.clone(),
                    };
                    let outcome = WorkOutcome::done(order.process_id)
                        .with_sheet_id(sheet_id)
                        .with_rows(42);
                    bus.publish_to(RESULT_QUEUE, serde_json::to_string(&outcome).unwrap())
                        .await;
                });
            }
        });
    }

    /// Let the spawned router/worker tasks subscribe before publishing.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_process_sheet_returns_worker_outcome() {
        let (bus, service) = spawn_harness(BridgeConfig::default());
        spawn_echo_worker(Arc::clone(&bus), Duration::from_millis(30));
        settle().await;

        let started = Instant::now();
        let outcome = service
            .process_sheet("https://docs.google.com/spreadsheets/d/ABC/edit")
            .await
            .expect("outcome");

        assert_eq!(outcome.status.as_deref(), Some("done"));
        assert_eq!(outcome.rows_processed, Some(42));
        // Resolved by the delivery, well before the 30s bound
        assert!(started.elapsed() < Duration::from_secs(5));
        // No residual waiter; the outcome is also pollable
        assert_eq!(service.pending_store().pending_count(), 0);
        assert!(service.status(&outcome.process_id).is_some());
    }

    #[tokio::test]
    async fn test_refresh_then_poll() {
        let (bus, service) = spawn_harness(BridgeConfig::default());
        spawn_echo_worker(Arc::clone(&bus), Duration::from_millis(30));
        settle().await;

        let process_id = service.refresh_project(1).await.expect("dispatched");

        // Fire-and-forget returned before any outcome could exist
        assert!(service.status(&process_id).is_none());

        // Poll until the worker's answer lands
        let outcome = timeout(Duration::from_secs(2), async {
            loop {
                if let Some(outcome) = service.status(&process_id) {
                    break outcome;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("poll timeout");

        assert_eq!(outcome.sheet_id.as_deref(), Some("SHEET_A"));
        assert_eq!(service.pending_store().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_refresh_all_dispatches_per_sheet() {
        let (bus, service) = spawn_harness(BridgeConfig::default());
        let mut orders = bus.subscribe(QueueFilter::queue(WORK_QUEUE));
        settle().await;

        let ids = service.refresh_all_projects().await.expect("dispatched");
        // beta has no sheet id and is skipped
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        for _ in 0..2 {
            let message = timeout(Duration::from_millis(200), orders.recv())
                .await
                .expect("timeout")
                .expect("order");
            let order: WorkOrder = serde_json::from_str(&message.body).unwrap();
            assert!(ids.contains(&order.process_id));
        }
    }

    // =========================================================================
    // TIMEOUT HANDLING
    // =========================================================================

    #[tokio::test]
    async fn test_process_times_out_without_worker() {
        let mut config = BridgeConfig::default();
        config.timeouts.process = Duration::from_millis(80);

        // No worker spawned: orders go nowhere
        let (_bus, service) = spawn_harness(config);
        settle().await;

        let started = Instant::now();
        let err = service
            .process_sheet("https://docs.google.com/spreadsheets/d/ABC/edit")
            .await
            .unwrap_err();

        assert!(matches!(err, BridgeError::Timeout(_)));
        let elapsed = started.elapsed();
        // At the bound, not much earlier or later
        assert!(elapsed >= Duration::from_millis(80));
        assert!(elapsed < Duration::from_secs(2));
        assert_eq!(service.pending_store().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_late_answer_after_timeout_is_pollable() {
        let mut config = BridgeConfig::default();
        config.timeouts.process = Duration::from_millis(50);

        let (bus, service) = spawn_harness(config);
        // Worker slower than the bound
        spawn_echo_worker(Arc::clone(&bus), Duration::from_millis(150));
        settle().await;

        let err = service
            .process_sheet("https://docs.google.com/spreadsheets/d/SLOW/edit")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(_)));

        // The late answer still lands in the cache
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(service.result_cache().len(), 1);
    }

    // =========================================================================
    // RESILIENCE
    // =========================================================================

    #[tokio::test]
    async fn test_listener_survives_garbage_on_result_queue() {
        let (bus, service) = spawn_harness(BridgeConfig::default());
        spawn_echo_worker(Arc::clone(&bus), Duration::from_millis(20));
        settle().await;

        // Poison the result queue before and during a real exchange
        bus.publish_to(RESULT_QUEUE, "not json").await;
        bus.publish_to(RESULT_QUEUE, r#"{"status":"done"}"#).await;

        let outcome = service
            .process_sheet("https://docs.google.com/spreadsheets/d/ABC/edit")
            .await
            .expect("outcome despite garbage");
        assert_eq!(outcome.rows_processed, Some(42));
    }

    #[tokio::test]
    async fn test_concurrent_processes_resolve_independently() {
        let (bus, service) = spawn_harness(BridgeConfig::default());
        spawn_echo_worker(Arc::clone(&bus), Duration::from_millis(20));
        settle().await;

        let mut handles = Vec::new();
        for n in 0..4 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let url = format!("https://docs.google.com/spreadsheets/d/SHEET_{n}/edit");
                service.process_sheet(&url).await
            }));
        }

        for (n, handle) in handles.into_iter().enumerate() {
            let outcome = handle.await.unwrap().expect("outcome");
            // Each caller saw its own sheet
            let sheet = outcome.sheet_id.unwrap();
            assert!(sheet.contains(&format!("SHEET_{n}")), "got {sheet}");
        }
        assert_eq!(service.pending_store().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_result_delivery_is_absorbed() {
        let (bus, service) = spawn_harness(BridgeConfig::default());
        settle().await;

        let process_id = service.refresh_project(3).await.expect("dispatched");

        let outcome = WorkOutcome::done(process_id).with_rows(1);
        let raw = serde_json::to_string(&outcome).unwrap();
        bus.publish_to(RESULT_QUEUE, raw.clone()).await;
        bus.publish_to(RESULT_QUEUE, raw).await;

        tokio::time::sleep(Duration::from_millis(50)).await;

        // Both deliveries were absorbed; the cache holds the outcome
        assert_eq!(service.status(&process_id).unwrap().rows_processed, Some(1));
        assert_eq!(service.pending_store().pending_count(), 0);
    }
}
