//! Index-backed reads and raw object downloads.

use super::{RepoService, artifact_kind_of};
use crate::error::{ApiError, ApiResult};
use chartroom_core::{ChartVersion, IndexFile, TenantScope};
use chartroom_storage::{StorageError, StorageObject};
use std::collections::BTreeMap;
use tracing::instrument;

impl RepoService {
    /// The tenant's full index. Index errors pass through unchanged.
    pub async fn fetch_index(&self, tenant: &TenantScope) -> ApiResult<IndexFile> {
        self.index.get(tenant).await
    }

    /// Every chart in the tenant's index with all of its versions.
    pub async fn fetch_all_charts(
        &self,
        tenant: &TenantScope,
    ) -> ApiResult<BTreeMap<String, Vec<ChartVersion>>> {
        Ok(self.fetch_index(tenant).await?.entries)
    }

    /// All versions of one chart, newest first.
    pub async fn fetch_chart(
        &self,
        tenant: &TenantScope,
        name: &str,
    ) -> ApiResult<Vec<ChartVersion>> {
        let mut index = self.fetch_index(tenant).await?;
        index.entries.remove(name).ok_or_else(not_found)
    }

    /// One chart version; `latest` selects the highest.
    pub async fn fetch_chart_version(
        &self,
        tenant: &TenantScope,
        name: &str,
        version: &str,
    ) -> ApiResult<ChartVersion> {
        let index = self.fetch_index(tenant).await?;
        index.resolve(name, version).cloned().ok_or_else(not_found)
    }

    /// Raw bytes of a package or provenance file.
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn fetch_raw_object(
        &self,
        tenant: &TenantScope,
        filename: &str,
    ) -> ApiResult<StorageObject> {
        artifact_kind_of(filename)?;

        match self.storage.get_object(&tenant.key(filename)).await {
            Ok(object) => Ok(object),
            Err(StorageError::NotFound(_)) => Err(not_found()),
            Err(e) => Err(ApiError::Storage(e)),
        }
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
