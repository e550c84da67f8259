//! Ports to external collaborators.

pub mod outbound;

pub use outbound::{CatalogError, InMemoryProjectCatalog, ProjectCatalog, ProjectSheet};
