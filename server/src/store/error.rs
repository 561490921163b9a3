use shared_types::{NameError, StampError};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("object store operation failed: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("collection document is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("invalid artifact name: {0}")]
    InvalidName(#[from] NameError),

    #[error("invalid version timestamp: {0}")]
    InvalidTimestamp(#[from] StampError),

    #[error("backend read failed: {0}")]
    BackendRead(#[source] BackendError),

    #[error("backend write failed: {0}")]
    BackendWrite(#[source] BackendError),

    /// The write itself was accepted; the backend just never reflected
    /// it within the deadline. The mutation may or may not have taken
    /// effect, so this is kept distinct from `BackendWrite`.
    #[error("verification of the update to {collection} timed out after {waited:?}")]
    ConfirmationTimeout { collection: String, waited: Duration },

    #[error("validator could not be run: {0}")]
    Validator(#[source] anyhow::Error),
}
