//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("invalid chart package: {0}")]
    InvalidPackage(String),

    #[error("invalid provenance file: {0}")]
    InvalidProvenance(String),

    #[error("invalid artifact identity: {0}")]
    InvalidIdentity(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
