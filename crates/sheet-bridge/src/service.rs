//! Sheet-sync service - the operations the HTTP layer calls.
//!
//! Owns the correlator and its stores, resolves refresh targets through the
//! project catalog, and hosts the scheduled-refresh loop.

use crate::domain::config::BridgeConfig;
use crate::domain::correlation::CorrelationId;
use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::pending::PendingJobStore;
use crate::domain::results::ResultCache;
use crate::domain::sheets::extract_sheet_id;
use crate::ipc::handler::{JobCorrelator, WorkSender};
use crate::ipc::requests::JobSpec;
use crate::ipc::responses::WorkOutcome;
use crate::ports::outbound::ProjectCatalog;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Service state behind the process/refresh/status endpoints.
pub struct SheetSyncService {
    config: BridgeConfig,
    correlator: Arc<JobCorrelator>,
    pending: Arc<PendingJobStore>,
    results: Arc<ResultCache>,
    catalog: Arc<dyn ProjectCatalog>,
}

impl std::fmt::Debug for SheetSyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetSyncService").finish_non_exhaustive()
    }
}

impl SheetSyncService {
    /// Create a new service.
    ///
    /// The transport is injected; callers also need to run a
    /// [`ResultListener`](crate::ipc::ResultListener) over the same stores
    /// (see [`pending_store`](Self::pending_store) /
    /// [`result_cache`](Self::result_cache)) for outcomes to arrive.
    pub fn new(
        config: BridgeConfig,
        sender: Arc<dyn WorkSender>,
        catalog: Arc<dyn ProjectCatalog>,
    ) -> Result<Self, BridgeError> {
        config
            .validate()
            .map_err(|e| BridgeError::Config(e.to_string()))?;

        let pending = Arc::new(PendingJobStore::new(config.timeouts.process));
        let results = Arc::new(ResultCache::new(config.result_cache.ttl));
        let correlator = Arc::new(JobCorrelator::new(
            Arc::clone(&pending),
            Arc::clone(&results),
            sender,
            config.timeouts.process,
        ));

        Ok(Self {
            config,
            correlator,
            pending,
            results,
            catalog,
        })
    }

    /// Process a sheet by URL and wait for the outcome.
    pub async fn process_sheet(&self, sheet_url: &str) -> BridgeResult<WorkOutcome> {
        let url = sheet_url.trim();
        if url.is_empty() {
            return Err(BridgeError::InvalidSheetUrl("sheet url is required".into()));
        }
        let sheet_id = extract_sheet_id(url)?;

        info!(sheet_id = %sheet_id, "Processing sheet");
        self.correlator
            .submit_and_wait(
                JobSpec::ProcessUrl {
                    sheet_url: url.to_string(),
                },
                None,
            )
            .await
    }

    /// Kick off a refresh for one project; returns the correlation id to
    /// poll with.
    pub async fn refresh_project(&self, project_id: i64) -> BridgeResult<CorrelationId> {
        info!(project_id = project_id, "Refreshing project");

        let sheet_id = self
            .catalog
            .sheet_id(project_id)
            .await
            .map_err(|e| BridgeError::Catalog(e.to_string()))?;

        let Some(sheet_id) = sheet_id.filter(|s| !s.trim().is_empty()) else {
            return Err(BridgeError::UnknownProject(project_id));
        };

        self.refresh_sheet(&sheet_id).await
    }

    /// Kick off a refresh for every catalogued project.
    ///
    /// Projects without a sheet id are skipped; a failure on one project
    /// does not stop the rest. Returns the initiated correlation ids.
    pub async fn refresh_all_projects(&self) -> BridgeResult<Vec<CorrelationId>> {
        let projects = self
            .catalog
            .projects()
            .await
            .map_err(|e| BridgeError::Catalog(e.to_string()))?;

        info!(count = projects.len(), "Refreshing all projects");

        let mut process_ids = Vec::new();
        for project in projects {
            let Some(sheet_id) = project
                .sheet_id
                .as_deref()
                .filter(|s| !s.trim().is_empty())
            else {
                warn!(project = %project.name, "Skipping project without sheet id");
                continue;
            };

            match self.refresh_sheet(sheet_id).await {
                Ok(process_id) => {
                    info!(
                        project = %project.name,
                        process_id = %process_id,
                        "Initiated refresh"
                    );
                    process_ids.push(process_id);
                }
                Err(e) => {
                    error!(project = %project.name, error = %e, "Failed to refresh project");
                }
            }
        }

        Ok(process_ids)
    }

    /// Manual trigger of the scheduled-refresh body.
    pub async fn trigger_refresh(&self) -> BridgeResult<Vec<CorrelationId>> {
        info!("Manual refresh triggered");
        self.refresh_all_projects().await
    }

    /// Look up the outcome for a correlation id, if one has arrived.
    pub fn status(&self, process_id: &CorrelationId) -> Option<WorkOutcome> {
        self.results.get(process_id)
    }

    async fn refresh_sheet(&self, sheet_id: &str) -> BridgeResult<CorrelationId> {
        self.correlator
            .fire_and_forget(JobSpec::RefreshSheet {
                sheet_id: sheet_id.to_string(),
            })
            .await
    }

    /// The waiter registry, shared with the result listener.
    pub fn pending_store(&self) -> Arc<PendingJobStore> {
        Arc::clone(&self.pending)
    }

    /// The result cache, shared with the result listener.
    pub fn result_cache(&self) -> Arc<ResultCache> {
        Arc::clone(&self.results)
    }

    /// The service configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

/// Periodic refresh of every catalogued project.
///
/// Runs immediately at startup and then every configured interval, the same
/// cadence the deployment's scheduler used. Returns at once when disabled.
pub async fn auto_refresh_task(service: Arc<SheetSyncService>) {
    let auto = service.config().auto_refresh.clone();
    if !auto.enabled {
        debug!("Auto-refresh is disabled");
        return;
    }

    let mut ticker = tokio::time::interval(auto.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        info!(interval = ?auto.interval, "Starting scheduled refresh of all projects");
        match service.refresh_all_projects().await {
            Ok(ids) => info!(initiated = ids.len(), "Scheduled refresh completed"),
            Err(e) => error!(error = %e, "Scheduled refresh failed"),
        }
    }
}
