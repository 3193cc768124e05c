//! Core domain types for the chartroom multi-tenant chart repository.
//!
//! This crate defines the data model shared by the storage and server crates:
//! - Tenant scopes and storage key layout
//! - Artifact kinds, identities and canonical naming
//! - Chart metadata extraction from packages
//! - The repository index model

pub mod artifact;
pub mod chart;
pub mod config;
pub mod error;
pub mod index;
pub mod namer;
pub mod tenant;

pub use artifact::{
    ArtifactIdentity, ArtifactKind, CandidateArtifact, PACKAGE_EXTENSION, PROVENANCE_EXTENSION,
    StoredArtifact,
};
pub use chart::ChartMetadata;
pub use error::{Error, Result};
pub use index::{ChartVersion, IndexFile, LATEST_VERSION};
pub use namer::{ArtifactNamer, ChartNamer};
pub use tenant::TenantScope;

/// Default maximum upload size: 20 MiB
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;
