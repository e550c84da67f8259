//! Outbound ports for the sheet bridge.
//!
//! The relational store holding projects is not this crate's concern; the
//! bridge only needs to resolve project ids to sheet ids and enumerate the
//! projects eligible for refresh.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// A project with its linked spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSheet {
    /// Project id.
    pub id: i64,
    /// Project name (for logging).
    pub name: String,
    /// Linked sheet id, if any.
    pub sheet_id: Option<String>,
}

/// Errors from the project catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The backing store could not be queried.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the project catalog.
#[async_trait]
pub trait ProjectCatalog: Send + Sync {
    /// Every project, newest first.
    async fn projects(&self) -> Result<Vec<ProjectSheet>, CatalogError>;

    /// Sheet id for one project, `None` when the project is unknown.
    async fn sheet_id(&self, project_id: i64) -> Result<Option<String>, CatalogError>;
}

/// Catalog backed by an in-memory list, for tests and standalone runs.
#[derive(Default)]
pub struct InMemoryProjectCatalog {
    projects: RwLock<Vec<ProjectSheet>>,
}

impl InMemoryProjectCatalog {
    pub fn new(projects: Vec<ProjectSheet>) -> Self {
        Self {
            projects: RwLock::new(projects),
        }
    }

    /// Add a project.
    pub fn insert(&self, project: ProjectSheet) {
        if let Ok(mut projects) = self.projects.write() {
            projects.push(project);
        }
    }
}

#[async_trait]
impl ProjectCatalog for InMemoryProjectCatalog {
    async fn projects(&self) -> Result<Vec<ProjectSheet>, CatalogError> {
        self.projects
            .read()
            .map(|p| p.clone())
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".into()))
    }

    async fn sheet_id(&self, project_id: i64) -> Result<Option<String>, CatalogError> {
        self.projects
            .read()
            .map(|projects| {
                projects
                    .iter()
                    .find(|p| p.id == project_id)
                    .and_then(|p| p.sheet_id.clone())
            })
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".into()))
    }
}
