use async_trait::async_trait;
use object_store::local::LocalFileSystem;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::config::StorageConfig;
use super::error::BackendError;

/// One backend collection: a flat map from key to text content.
pub type Collection = HashMap<String, String>;

/// Eventually-consistent keyed-collection store.
///
/// `fetch` distinguishes a collection that was never written (`None`)
/// from one that exists but is empty. Backends are free to normalize
/// an emptied collection back to absent; callers that just emptied one
/// must accept `None` on read-back.
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    async fn fetch(&self, collection: &str) -> Result<Option<Collection>, BackendError>;
    async fn store(&self, collection: &str, data: Collection) -> Result<(), BackendError>;
}

/// Durable backend persisting each collection as a single JSON
/// document in an object store.
pub struct ObjectStoreBackend {
    store: Arc<dyn ObjectStore>,
}

impl ObjectStoreBackend {
    pub fn from_config(config: StorageConfig) -> Result<Self, BackendError> {
        let store: Arc<dyn ObjectStore> = match config {
            StorageConfig::Local { path } => Arc::new(LocalFileSystem::new_with_prefix(path)?),
        };
        Ok(Self { store })
    }

    fn object_path(collection: &str) -> Path {
        Path::from(format!("{collection}.json"))
    }
}

#[async_trait]
impl KeyValueBackend for ObjectStoreBackend {
    async fn fetch(&self, collection: &str) -> Result<Option<Collection>, BackendError> {
        let path = Self::object_path(collection);
        match self.store.get(&path).await {
            Ok(result) => {
                let bytes = result.bytes().await?;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, collection: &str, data: Collection) -> Result<(), BackendError> {
        let path = Self::object_path(collection);
        if data.is_empty() {
            // An emptied collection reads back as absent, like the
            // original key-value backend normalizing an empty map.
            return match self.store.delete(&path).await {
                Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        let json = serde_json::to_vec_pretty(&data)?;
        self.store.put(&path, PutPayload::from(json)).await?;
        Ok(())
    }
}

#[derive(Default, Clone)]
struct Slot {
    /// Target state once the propagation lag elapses; `None` = absent.
    committed: Option<Collection>,
    /// State exposed until then.
    previous: Option<Collection>,
    committed_at: Option<Instant>,
}

impl Slot {
    fn visible(&self, lag: Duration) -> Option<Collection> {
        match self.committed_at {
            Some(at) if at.elapsed() < lag => self.previous.clone(),
            _ => self.committed.clone(),
        }
    }
}

/// In-memory backend for tests and embedded use.
///
/// A configurable propagation lag delays the visibility of each write,
/// which lets tests exercise the read-after-write confirmation loop
/// the same way a slow real backend would. Individual collections can
/// also be poisoned to fail reads or writes.
#[derive(Default)]
pub struct MemoryBackend {
    lag: Duration,
    slots: RwLock<HashMap<String, Slot>>,
    failing_writes: RwLock<HashSet<String>>,
    failing_fetches: RwLock<HashSet<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lag(lag: Duration) -> Self {
        Self {
            lag,
            ..Self::default()
        }
    }

    /// All subsequent writes to `collection` fail.
    pub async fn fail_writes_to(&self, collection: &str) {
        self.failing_writes.write().await.insert(collection.to_string());
    }

    /// All subsequent reads of `collection` fail.
    pub async fn fail_fetches_from(&self, collection: &str) {
        self.failing_fetches.write().await.insert(collection.to_string());
    }
}

#[async_trait]
impl KeyValueBackend for MemoryBackend {
    async fn fetch(&self, collection: &str) -> Result<Option<Collection>, BackendError> {
        if self.failing_fetches.read().await.contains(collection) {
            return Err(BackendError::Unavailable(format!(
                "fetch of {collection} failed"
            )));
        }
        let slots = self.slots.read().await;
        Ok(slots.get(collection).and_then(|s| s.visible(self.lag)))
    }

    async fn store(&self, collection: &str, data: Collection) -> Result<(), BackendError> {
        if self.failing_writes.read().await.contains(collection) {
            return Err(BackendError::Unavailable(format!(
                "write to {collection} failed"
            )));
        }
        let mut slots = self.slots.write().await;
        let slot = slots.entry(collection.to_string()).or_default();
        slot.previous = slot.visible(self.lag);
        // Empty maps normalize to absent, matching the durable backend.
        slot.committed = (!data.is_empty()).then_some(data);
        slot.committed_at = Some(Instant::now());
        Ok(())
    }
}
