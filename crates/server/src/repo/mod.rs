//! Repository request orchestration.
//!
//! [`RepoService`] turns tenant-scoped requests into object-store calls:
//! content-derived naming, overwrite policy, multi-object writes with
//! compensating rollback, tolerant deletes and index-backed reads. It holds
//! no per-request state; every collaborator is behind a trait object.

mod ingest;
mod lifecycle;
mod retrieve;

use crate::error::{ApiError, ApiResult};
use crate::index::TenantIndex;
use bytes::Bytes;
use chartroom_core::ArtifactKind;
use chartroom_core::config::RepoConfig;
use chartroom_core::namer::ArtifactNamer;
use chartroom_storage::ObjectStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Upload and delete policy, fixed at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoPolicy {
    /// Replace existing objects instead of answering with a conflict.
    pub allow_overwrite: bool,
    /// Form field carrying the chart package.
    pub chart_form_field: String,
    /// Form field carrying the provenance file.
    pub prov_form_field: String,
}

impl Default for RepoPolicy {
    fn default() -> Self {
        Self::from(&RepoConfig::default())
    }
}

impl From<&RepoConfig> for RepoPolicy {
    fn from(config: &RepoConfig) -> Self {
        Self {
            allow_overwrite: config.allow_overwrite,
            chart_form_field: config.chart_form_field.clone(),
            prov_form_field: config.prov_form_field.clone(),
        }
    }
}

impl RepoPolicy {
    /// Form fields in the order they are processed and written.
    pub fn form_fields(&self) -> [(ArtifactKind, &str); 2] {
        [
            (ArtifactKind::Package, self.chart_form_field.as_str()),
            (ArtifactKind::Provenance, self.prov_form_field.as_str()),
        ]
    }

    /// Whether `name` is one of the configured form fields.
    pub fn is_form_field(&self, name: &str) -> bool {
        name == self.chart_form_field || name == self.prov_form_field
    }
}

/// Classify a bare filename, rejecting anything that is not a single
/// package or provenance filename.
pub(crate) fn artifact_kind_of(filename: &str) -> ApiResult<ArtifactKind> {
    if filename.is_empty() || filename.contains(['/', '\\']) || filename.contains("..") {
        return Err(ApiError::BadRequest(format!("invalid filename: {filename}")));
    }
    ArtifactKind::from_filename(filename)
        .ok_or_else(|| ApiError::BadRequest(format!("unsupported file extension: {filename}")))
}

/// Confirmation body for a successful upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saved {
    pub saved: bool,
}

impl Saved {
    pub const fn new() -> Self {
        Self { saved: true }
    }
}

/// Confirmation body for a successful delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub deleted: bool,
}

impl Deleted {
    pub const fn new() -> Self {
        Self { deleted: true }
    }
}

/// Parts of a multipart upload, keyed by field name.
#[derive(Clone, Debug, Default)]
pub struct FormFields {
    parts: HashMap<String, Bytes>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a part. The first part seen for a field wins.
    pub fn insert(&mut self, field: impl Into<String>, content: Bytes) {
        self.parts.entry(field.into()).or_insert(content);
    }

    /// Builder form of [`FormFields::insert`].
    pub fn with(mut self, field: impl Into<String>, content: impl Into<Bytes>) -> Self {
        self.insert(field, content.into());
        self
    }

    /// Remove and return the part for `field`.
    pub fn take(&mut self, field: &str) -> Option<Bytes> {
        self.parts.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.parts.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Tenant-scoped repository operations.
#[derive(Clone)]
pub struct RepoService {
    storage: Arc<dyn ObjectStore>,
    namer: Arc<dyn ArtifactNamer>,
    index: Arc<dyn TenantIndex>,
    policy: RepoPolicy,
}

impl RepoService {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        namer: Arc<dyn ArtifactNamer>,
        index: Arc<dyn TenantIndex>,
        policy: RepoPolicy,
    ) -> Self {
        Self {
            storage,
            namer,
            index,
            policy,
        }
    }

    pub fn policy(&self) -> &RepoPolicy {
        &self.policy
    }
}
