//! Object storage abstraction and backends for Chartroom.
//!
//! This crate provides:
//! - A flat key/value [`ObjectStore`] trait with conditional writes
//! - A local filesystem backend with atomic, traversal-safe writes

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{content_type_for_key, filesystem::FilesystemBackend};
pub use error::{StorageError, StorageResult};
pub use traits::{ObjectMeta, ObjectStore, StorageObject};

use chartroom_core::config::StorageConfig;
use std::sync::Arc;

/// Create an object store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn ObjectStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
    }
}
