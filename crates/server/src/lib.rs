//! HTTP server for the Chartroom multi-tenant chart repository.
//!
//! This crate provides:
//! - The repository orchestrator (uploads, deletes, reads)
//! - Tenant index materialization from storage
//! - Helm-compatible and JSON API routes
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod index;
pub mod metrics;
pub mod repo;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorKind};
pub use index::{StorageIndex, TenantIndex};
pub use repo::{Deleted, FormFields, RepoPolicy, RepoService, Saved};
pub use routes::create_router;
pub use state::AppState;
