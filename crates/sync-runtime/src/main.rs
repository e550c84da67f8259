//! # Sheet-Sync Runtime
//!
//! Entry point for the Opsboard ingest side. Wires together:
//!
//! - the in-memory queue bus (broker stand-in),
//! - the [`SheetSyncService`] with its correlator and stores,
//! - the result router + listener consuming the result queue,
//! - the background sweeps and the scheduled refresh task,
//! - optionally, a loopback worker simulator for development runs.
//!
//! ## Startup sequence
//!
//! 1. Initialize logging (RUST_LOG controls the filter)
//! 2. Load configuration (JSON file path as first argument, defaults otherwise)
//! 3. Build the bus, catalog, and service
//! 4. Spawn router, listener, sweeps, scheduled refresh
//! 5. Wait for ctrl-c

mod worker_sim;

use anyhow::{Context, Result};
use serde::Deserialize;
use sheet_bridge::domain::pending;
use sheet_bridge::domain::results;
use sheet_bridge::ipc::{QueueResultReceiver, QueueWorkSender, ResultRouter};
use sheet_bridge::service::auto_refresh_task;
use sheet_bridge::{
    BridgeConfig, InMemoryProjectCatalog, ProjectSheet, ResultListener, SheetSyncService,
};
use shared_bus::InMemoryQueueBus;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Buffer between the result router and the listener.
const RESULT_CHANNEL_CAPACITY: usize = 1024;

/// Runtime configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RuntimeConfig {
    /// Bridge configuration (queues, timeouts, refresh, cache).
    bridge: BridgeConfig,
    /// Run the loopback worker simulator instead of expecting a real worker.
    simulate_worker: bool,
    /// Seed projects for the in-memory catalog.
    projects: Vec<ProjectSheet>,
}

fn load_config() -> Result<RuntimeConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config file {path}"))
        }
        None => Ok(RuntimeConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = sheet_bridge::VERSION, "Starting sheet-sync runtime");

    let config = load_config()?;
    let queues = config.bridge.queues.clone();

    let bus = Arc::new(InMemoryQueueBus::new());
    let catalog = Arc::new(InMemoryProjectCatalog::new(config.projects));
    let sender = Arc::new(QueueWorkSender::new(Arc::clone(&bus), queues.work.clone()));

    let service = Arc::new(SheetSyncService::new(config.bridge, sender, catalog)?);

    // Result queue -> router -> listener -> waiters/cache
    let (raw_tx, raw_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
    let router = ResultRouter::new(Arc::clone(&bus), queues.result.clone(), raw_tx);
    tokio::spawn(router.run());

    let listener = ResultListener::new(
        service.pending_store(),
        service.result_cache(),
        Arc::new(QueueResultReceiver::new(raw_rx)),
    );
    tokio::spawn(listener.run());

    // Background sweeps
    tokio::spawn(pending::cleanup_task(
        service.pending_store(),
        service.config().timeouts.pending_sweep,
    ));
    if service.config().result_cache.ttl.is_some() {
        tokio::spawn(results::eviction_task(
            service.result_cache(),
            service.config().result_cache.sweep_interval,
        ));
    }

    // Scheduled refresh of all projects
    tokio::spawn(auto_refresh_task(Arc::clone(&service)));

    if config.simulate_worker {
        info!("Worker simulator enabled");
        tokio::spawn(worker_sim::run(
            Arc::clone(&bus),
            queues.work.clone(),
            queues.result.clone(),
        ));
    }

    info!(
        work_queue = %queues.work,
        result_queue = %queues.result,
        "Sheet-sync runtime ready"
    );

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("Shutting down");

    Ok(())
}
