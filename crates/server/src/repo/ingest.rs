//! Artifact ingestion: raw bodies and multipart forms.

use super::{FormFields, RepoService, Saved, artifact_kind_of};
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use bytes::Bytes;
use chartroom_core::{ArtifactKind, CandidateArtifact, StoredArtifact, TenantScope};
use chartroom_storage::StorageError;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

impl RepoService {
    /// Store a raw chart package.
    #[instrument(skip(self, content), fields(tenant = %tenant, size = content.len()))]
    pub async fn ingest_single(&self, tenant: &TenantScope, content: Bytes) -> ApiResult<Saved> {
        self.ingest_raw(tenant, ArtifactKind::Package, content).await
    }

    /// Store a raw provenance file.
    #[instrument(skip(self, content), fields(tenant = %tenant, size = content.len()))]
    pub async fn ingest_provenance(
        &self,
        tenant: &TenantScope,
        content: Bytes,
    ) -> ApiResult<Saved> {
        self.ingest_raw(tenant, ArtifactKind::Provenance, content)
            .await
    }

    /// Store the package and/or provenance file carried by a form.
    ///
    /// Fields are validated and probed in order, package first. Nothing is
    /// written until every present field has passed. If a write fails, the
    /// objects already written by this call are deleted again.
    #[instrument(skip(self, fields), fields(tenant = %tenant))]
    pub async fn ingest_form(
        &self,
        tenant: &TenantScope,
        mut fields: FormFields,
    ) -> ApiResult<Saved> {
        let mut candidates = Vec::with_capacity(2);
        for (kind, field) in self.policy.form_fields() {
            let Some(content) = fields.take(field) else {
                continue;
            };
            let candidate = self.prepare(kind, content, Some(field)).await?;
            self.ensure_absent(tenant, &candidate).await?;
            candidates.push(candidate);
        }

        if candidates.is_empty() {
            return Err(ApiError::BadRequest(format!(
                "no package or provenance file found in form fields {} and {}",
                self.policy.chart_form_field, self.policy.prov_form_field
            )));
        }

        self.store_batch(tenant, candidates).await?;
        Ok(Saved::new())
    }

    async fn ingest_raw(
        &self,
        tenant: &TenantScope,
        kind: ArtifactKind,
        content: Bytes,
    ) -> ApiResult<Saved> {
        let candidate = self.prepare(kind, content, None).await?;
        self.ensure_absent(tenant, &candidate).await?;
        self.store_batch(tenant, vec![candidate]).await?;
        Ok(Saved::new())
    }

    /// Derive the canonical filename for `content`.
    ///
    /// Naming may decompress a whole archive, so it runs on the blocking pool.
    async fn prepare(
        &self,
        kind: ArtifactKind,
        content: Bytes,
        field: Option<&str>,
    ) -> ApiResult<CandidateArtifact> {
        let namer = Arc::clone(&self.namer);
        let bytes = content.clone();
        let filename = tokio::task::spawn_blocking(move || namer.name_from_content(kind, &bytes))
            .await
            .map_err(|e| ApiError::Internal(format!("spawn_blocking failed: {e}")))??;

        if artifact_kind_of(&filename)? != kind {
            return Err(ApiError::BadRequest(format!(
                "derived filename {filename} is not a {}",
                kind.label()
            )));
        }

        Ok(CandidateArtifact {
            kind,
            filename,
            content,
            source_field: field.map(str::to_string),
        })
    }

    /// Reject the candidate if its key is taken and overwrites are off.
    async fn ensure_absent(
        &self,
        tenant: &TenantScope,
        candidate: &CandidateArtifact,
    ) -> ApiResult<()> {
        if self.policy.allow_overwrite {
            return Ok(());
        }

        let key = tenant.key(&candidate.filename);
        match self.storage.exists(&key).await {
            Ok(false) | Err(StorageError::NotFound(_)) => Ok(()),
            Ok(true) => {
                metrics::UPLOAD_CONFLICTS.inc();
                debug!(tenant = %tenant, filename = %candidate.filename, "Artifact already exists");
                Err(already_exists(candidate))
            }
            Err(e) => Err(ApiError::Backend(format!(
                "failed to check for existing {}: {e}",
                candidate.filename
            ))),
        }
    }

    /// Write candidates in order, compensating on the first failure.
    async fn store_batch(
        &self,
        tenant: &TenantScope,
        candidates: Vec<CandidateArtifact>,
    ) -> ApiResult<()> {
        let mut stored: Vec<StoredArtifact> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let key = tenant.key(&candidate.filename);
            debug!(
                tenant = %tenant,
                filename = %candidate.filename,
                field = candidate.source_field.as_deref().unwrap_or("body"),
                "Adding {} to storage",
                candidate.kind.label()
            );

            if let Err(err) = self.write(&key, &candidate).await {
                self.rollback(tenant, &stored).await;
                return Err(err);
            }

            metrics::record_saved(candidate.kind);
            stored.push(StoredArtifact {
                kind: candidate.kind,
                key,
            });
        }

        info!(
            tenant = %tenant,
            keys = ?stored.iter().map(|s| s.key.as_str()).collect::<Vec<_>>(),
            "Stored artifacts"
        );
        Ok(())
    }

    async fn write(&self, key: &str, candidate: &CandidateArtifact) -> ApiResult<()> {
        let content = candidate.content.clone();
        let backend_error =
            |e: StorageError| ApiError::Backend(format!("failed to store {}: {e}", candidate.filename));

        if self.policy.allow_overwrite {
            return self.storage.put(key, content).await.map_err(backend_error);
        }

        match self.storage.put_if_not_exists(key, content).await {
            Ok(true) => Ok(()),
            Ok(false) | Err(StorageError::AlreadyExists(_)) => {
                metrics::UPLOAD_CONFLICTS.inc();
                Err(already_exists(candidate))
            }
            Err(e) => Err(backend_error(e)),
        }
    }

    /// Delete everything written so far, newest first. Failures are logged
    /// and otherwise ignored.
    async fn rollback(&self, tenant: &TenantScope, stored: &[StoredArtifact]) {
        if stored.is_empty() {
            return;
        }
        metrics::UPLOAD_ROLLBACKS.inc();

        for artifact in stored.iter().rev() {
            match self.storage.delete(&artifact.key).await {
                Ok(()) => {
                    debug!(tenant = %tenant, key = %artifact.key, "Rolled back {}", artifact.kind.label());
                }
                Err(e) => {
                    metrics::ROLLBACK_DELETE_FAILURES.inc();
                    warn!(
                        tenant = %tenant,
                        key = %artifact.key,
                        error = %e,
                        "Failed to roll back {}",
                        artifact.kind.label()
                    );
                }
            }
        }
    }
}

fn already_exists(candidate: &CandidateArtifact) -> ApiError {
    ApiError::Conflict(format!("{} already exists", candidate.filename))
}
