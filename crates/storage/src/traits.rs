//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use time::OffsetDateTime;

/// Flat key/value object store.
///
/// Keys are `/`-separated relative paths. Tenancy is expressed purely by key
/// prefix; the store itself knows nothing about tenants.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's metadata without fetching content.
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Get an object's content together with its metadata.
    async fn get_object(&self, key: &str) -> StorageResult<StorageObject> {
        let meta = self.head(key).await?;
        let content = self.get(key).await?;
        Ok(StorageObject {
            content,
            content_type: meta.content_type,
            last_modified: meta.last_modified,
        })
    }

    /// Put an object, replacing any existing object under the key.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Put an object only if nothing exists under the key.
    ///
    /// Returns `false` when the key was already taken. Backends that cannot
    /// make this atomic may fall back to check-then-write.
    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<bool>;

    /// Delete an object. Missing objects yield [`StorageError::NotFound`].
    ///
    /// [`StorageError::NotFound`]: crate::StorageError::NotFound
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List every object key under a prefix, recursively.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get the name of this storage backend.
    ///
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend connectivity.
    ///
    /// Called once at startup. The default implementation returns `Ok(())`.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Metadata about a stored object.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time (if available).
    pub last_modified: Option<OffsetDateTime>,
    /// Content type (if available).
    pub content_type: Option<String>,
}

/// A fetched object.
#[derive(Clone, Debug)]
pub struct StorageObject {
    pub content: Bytes,
    pub content_type: Option<String>,
    pub last_modified: Option<OffsetDateTime>,
}
