//! Application state shared across handlers.

use crate::index::{StorageIndex, TenantIndex};
use crate::repo::{RepoPolicy, RepoService};
use chartroom_core::config::AppConfig;
use chartroom_core::namer::{ArtifactNamer, ChartNamer};
use chartroom_storage::ObjectStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Object storage backend.
    pub storage: Arc<dyn ObjectStore>,
    /// Repository orchestrator.
    pub repo: RepoService,
}

impl AppState {
    /// Create state with the chart namer and a storage-backed index.
    pub fn new(config: AppConfig, storage: Arc<dyn ObjectStore>) -> Self {
        let index = Arc::new(StorageIndex::new(storage.clone()));
        Self::with_collaborators(config, storage, Arc::new(ChartNamer::new()), index)
    }

    /// Create state with explicit naming and index collaborators.
    pub fn with_collaborators(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        namer: Arc<dyn ArtifactNamer>,
        index: Arc<dyn TenantIndex>,
    ) -> Self {
        let policy = RepoPolicy::from(&config.repo);
        let repo = RepoService::new(storage.clone(), namer, index, policy);
        Self {
            config: Arc::new(config),
            storage,
            repo,
        }
    }
}
