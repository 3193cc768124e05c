//! Tenant index materialization.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use async_trait::async_trait;
use bytes::Bytes;
use chartroom_core::{ArtifactKind, ChartMetadata, ChartVersion, IndexFile, TenantScope};
use chartroom_storage::{ObjectStore, StorageError};
use futures::{StreamExt, TryStreamExt};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

/// Default number of packages read concurrently while building an index.
pub const DEFAULT_INDEX_CONCURRENCY: usize = 8;

/// Source of per-tenant repository indexes.
#[async_trait]
pub trait TenantIndex: Send + Sync + 'static {
    /// Build or fetch the index for `tenant`.
    async fn get(&self, tenant: &TenantScope) -> ApiResult<IndexFile>;
}

/// Builds a tenant's index from the packages found in storage.
///
/// Every call lists the tenant prefix and reads each package, so the index
/// always reflects storage at call time.
pub struct StorageIndex {
    storage: Arc<dyn ObjectStore>,
    concurrency: usize,
}

impl StorageIndex {
    pub fn new(storage: Arc<dyn ObjectStore>) -> Self {
        Self {
            storage,
            concurrency: DEFAULT_INDEX_CONCURRENCY,
        }
    }

    /// Set how many packages are read concurrently.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Read one package into an index entry.
    ///
    /// Packages that vanish mid-build or fail to parse are skipped.
    async fn load(&self, key: String, filename: String) -> ApiResult<Option<ChartVersion>> {
        let object = match self.storage.get_object(&key).await {
            Ok(object) => object,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => {
                return Err(ApiError::Backend(format!("failed to read {key}: {e}")));
            }
        };

        let content = object.content;
        let parsed = tokio::task::spawn_blocking(move || parse_package(&content))
            .await
            .map_err(|e| ApiError::Internal(format!("spawn_blocking failed: {e}")))?;

        match parsed {
            Ok((metadata, digest)) => Ok(Some(ChartVersion {
                metadata,
                urls: vec![format!("charts/{filename}")],
                created: object
                    .last_modified
                    .unwrap_or_else(OffsetDateTime::now_utc),
                digest,
            })),
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping unreadable chart package");
                Ok(None)
            }
        }
    }
}

fn parse_package(content: &Bytes) -> chartroom_core::Result<(ChartMetadata, String)> {
    let metadata = ChartMetadata::from_package(content)?;
    let digest = hex::encode(Sha256::digest(content));
    Ok((metadata, digest))
}

#[async_trait]
impl TenantIndex for StorageIndex {
    #[instrument(skip(self), fields(tenant = %tenant))]
    async fn get(&self, tenant: &TenantScope) -> ApiResult<IndexFile> {
        let timer = metrics::INDEX_BUILD_DURATION.start_timer();
        let prefix = tenant.prefix();

        let keys = self
            .storage
            .list(&prefix)
            .await
            .map_err(|e| ApiError::Backend(format!("failed to list charts for {tenant}: {e}")))?;

        let packages: Vec<(String, String)> = keys
            .into_iter()
            .filter_map(|key| {
                let filename = key.strip_prefix(&prefix)?.to_string();
                let direct_child = !filename.contains('/');
                (direct_child && ArtifactKind::from_filename(&filename) == Some(ArtifactKind::Package))
                    .then_some((key, filename))
            })
            .collect();

        let versions: Vec<Option<ChartVersion>> = futures::stream::iter(packages)
            .map(|(key, filename)| self.load(key, filename))
            .buffer_unordered(self.concurrency)
            .try_collect()
            .await?;

        let mut index = IndexFile::new();
        for version in versions.into_iter().flatten() {
            index.add(version);
        }
        index.sort_entries();

        metrics::INDEX_BUILDS.inc();
        timer.observe_duration();
        debug!(tenant = %tenant, versions = index.len(), "Built tenant index");
        Ok(index)
    }
}
