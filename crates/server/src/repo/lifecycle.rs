//! Artifact deletion.

use super::{Deleted, RepoService};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use chartroom_core::{ArtifactIdentity, ArtifactKind, TenantScope};
use chartroom_storage::StorageError;
use tracing::{debug, instrument, warn};

impl RepoService {
    /// Delete a chart version and, if present, its provenance file.
    ///
    /// Any failure deleting the package reports not found and leaves the
    /// provenance file alone. The provenance delete is best-effort.
    #[instrument(skip(self), fields(tenant = %tenant))]
    pub async fn delete_artifact(
        &self,
        tenant: &TenantScope,
        name: &str,
        version: &str,
    ) -> ApiResult<Deleted> {
        let identity = ArtifactIdentity::new(name, version);
        let package = self.namer.name_from_identity(ArtifactKind::Package, &identity)?;
        let package_key = tenant.key(&package);

        debug!(tenant = %tenant, package = %package, "Deleting package from storage");
        match self.storage.delete(&package_key).await {
            Ok(()) => metrics::record_deleted(ArtifactKind::Package),
            Err(StorageError::NotFound(_)) => return Err(not_found()),
            Err(e) => {
                warn!(tenant = %tenant, key = %package_key, error = %e, "Package delete failed");
                return Err(not_found());
            }
        }

        let provenance = self
            .namer
            .name_from_identity(ArtifactKind::Provenance, &identity)?;
        let provenance_key = tenant.key(&provenance);
        match self.storage.delete(&provenance_key).await {
            Ok(()) => metrics::record_deleted(ArtifactKind::Provenance),
            Err(e) => debug!(key = %provenance_key, error = %e, "No provenance file removed"),
        }

        Ok(Deleted::new())
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
