//! Storage test doubles.

use async_trait::async_trait;
use bytes::Bytes;
use chartroom_storage::{
    FilesystemBackend, ObjectMeta, ObjectStore, StorageError, StorageResult,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Barrier;

/// Filesystem storage in a temp directory.
#[allow(dead_code)]
pub struct TestStorage {
    pub backend: Arc<FilesystemBackend>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestStorage {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let backend = FilesystemBackend::new(temp_dir.path().join("storage"))
            .await
            .expect("Failed to create storage backend");
        Self {
            backend: Arc::new(backend),
            _temp_dir: temp_dir,
        }
    }

    pub fn store(&self) -> Arc<dyn ObjectStore> {
        self.backend.clone()
    }
}

/// A storage call seen by [`FaultyStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum StoreOp {
    Exists(String),
    Head(String),
    Get(String),
    Put(String),
    PutIfNotExists(String),
    Delete(String),
    List(String),
}

#[allow(dead_code)]
impl StoreOp {
    pub fn key(&self) -> &str {
        match self {
            Self::Exists(k)
            | Self::Head(k)
            | Self::Get(k)
            | Self::Put(k)
            | Self::PutIfNotExists(k)
            | Self::Delete(k)
            | Self::List(k) => k,
        }
    }

    pub fn is_write(&self) -> bool {
        matches!(self, Self::Put(_) | Self::PutIfNotExists(_))
    }
}

#[derive(Default)]
struct Faults {
    exists: Vec<String>,
    writes: Vec<String>,
    deletes: Vec<String>,
    list: bool,
}

/// Wraps a store, logs every call and fails calls on request.
///
/// Fault rules match keys by suffix, so `"tgz.prov"` fails every provenance
/// key while `"nginx-1.0.0.tgz"` fails one package.
#[allow(dead_code)]
pub struct FaultyStore {
    inner: Arc<dyn ObjectStore>,
    ops: Mutex<Vec<StoreOp>>,
    faults: Mutex<Faults>,
}

#[allow(dead_code)]
impl FaultyStore {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            ops: Mutex::new(Vec::new()),
            faults: Mutex::new(Faults::default()),
        })
    }

    pub fn fail_exists(&self, suffix: &str) {
        self.faults.lock().unwrap().exists.push(suffix.to_string());
    }

    pub fn fail_writes(&self, suffix: &str) {
        self.faults.lock().unwrap().writes.push(suffix.to_string());
    }

    pub fn fail_deletes(&self, suffix: &str) {
        self.faults.lock().unwrap().deletes.push(suffix.to_string());
    }

    pub fn fail_list(&self) {
        self.faults.lock().unwrap().list = true;
    }

    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    fn record(&self, op: StoreOp) {
        self.ops.lock().unwrap().push(op);
    }

    fn injected(key: &str) -> StorageError {
        StorageError::Io(std::io::Error::other(format!("injected failure for {key}")))
    }

    fn matches(rules: &[String], key: &str) -> bool {
        rules.iter().any(|suffix| key.ends_with(suffix.as_str()))
    }
}

#[async_trait]
impl ObjectStore for FaultyStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.record(StoreOp::Exists(key.to_string()));
        let fail = Self::matches(&self.faults.lock().unwrap().exists, key);
        if fail {
            return Err(Self::injected(key));
        }
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        self.record(StoreOp::Head(key.to_string()));
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.record(StoreOp::Get(key.to_string()));
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.record(StoreOp::Put(key.to_string()));
        let fail = Self::matches(&self.faults.lock().unwrap().writes, key);
        if fail {
            return Err(Self::injected(key));
        }
        self.inner.put(key, data).await
    }

    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<bool> {
        self.record(StoreOp::PutIfNotExists(key.to_string()));
        let fail = Self::matches(&self.faults.lock().unwrap().writes, key);
        if fail {
            return Err(Self::injected(key));
        }
        self.inner.put_if_not_exists(key, data).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.record(StoreOp::Delete(key.to_string()));
        let fail = Self::matches(&self.faults.lock().unwrap().deletes, key);
        if fail {
            return Err(Self::injected(key));
        }
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.record(StoreOp::List(prefix.to_string()));
        let fail = self.faults.lock().unwrap().list;
        if fail {
            return Err(Self::injected(prefix));
        }
        self.inner.list(prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "faulty"
    }
}

/// A store without an atomic conditional put.
///
/// Every probe and every conditional put waits at a shared barrier after its
/// check, so `parties` concurrent writers all observe the key as absent
/// before any of them writes.
#[allow(dead_code)]
pub struct RacyStore {
    inner: Arc<dyn ObjectStore>,
    barrier: Barrier,
}

#[allow(dead_code)]
impl RacyStore {
    pub fn new(inner: Arc<dyn ObjectStore>, parties: usize) -> Arc<Self> {
        Arc::new(Self {
            inner,
            barrier: Barrier::new(parties),
        })
    }
}

#[async_trait]
impl ObjectStore for RacyStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let exists = self.inner.exists(key).await;
        self.barrier.wait().await;
        exists
    }

    async fn head(&self, key: &str) -> StorageResult<ObjectMeta> {
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.inner.put(key, data).await
    }

    async fn put_if_not_exists(&self, key: &str, data: Bytes) -> StorageResult<bool> {
        let taken = self.inner.exists(key).await?;
        self.barrier.wait().await;
        if taken {
            return Ok(false);
        }
        self.inner.put(key, data).await?;
        Ok(true)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        self.inner.list(prefix).await
    }

    fn backend_name(&self) -> &'static str {
        "racy"
    }
}
