mod adapter;
mod backend;
mod config;
mod error;
mod retention;
mod retry;
pub mod version_key;
mod versioned;


pub use adapter::CollectionClient;
pub use backend::{Collection, KeyValueBackend, MemoryBackend, ObjectStoreBackend};
pub use config::{CollectionPair, StorageConfig, StoreConfig};
pub use error::{BackendError, StoreError};
pub use retention::RetentionPolicy;
pub use retry::{Backoff, retry};
pub use versioned::{DeleteOutcome, UpdateOutcome, VersionedStore};
