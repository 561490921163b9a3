use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

use super::backend::{Collection, KeyValueBackend};
use super::error::StoreError;

/// Read/write access to backend collections, with commits confirmed by
/// a read-after-write poll.
///
/// The backend is only eventually consistent: a `store` that returns
/// cleanly may not be visible to the next `fetch`. `commit` therefore
/// polls until the backend reflects the write or a deadline passes.
/// Note that a confirmed commit only means the store can observe its
/// own write; downstream consumers of the backend may still be behind.
pub struct CollectionClient {
    backend: Arc<dyn KeyValueBackend>,
    poll_interval: Duration,
    confirm_timeout: Duration,
}

impl CollectionClient {
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        poll_interval: Duration,
        confirm_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            poll_interval,
            confirm_timeout,
        }
    }

    pub async fn fetch(&self, collection: &str) -> Result<Option<Collection>, StoreError> {
        self.backend
            .fetch(collection)
            .await
            .map_err(StoreError::BackendRead)
    }

    /// Write `data` and poll (immediately, then every interval) until
    /// the backend reflects it. A failed write returns right away with
    /// no retry; a failed poll read aborts the confirmation; a silent
    /// backend runs into `ConfirmationTimeout`.
    pub async fn commit(&self, collection: &str, data: Collection) -> Result<(), StoreError> {
        self.backend
            .store(collection, data.clone())
            .await
            .map_err(StoreError::BackendWrite)?;

        let started = Instant::now();
        loop {
            let observed = self
                .backend
                .fetch(collection)
                .await
                .map_err(StoreError::BackendRead)?;
            if Self::reflects(&data, observed.as_ref()) {
                return Ok(());
            }
            debug!(collection, "committed update not yet visible");
            if started.elapsed() >= self.confirm_timeout {
                return Err(StoreError::ConfirmationTimeout {
                    collection: collection.to_string(),
                    waited: started.elapsed(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }

    // A just-emptied collection may read back as absent rather than as
    // an empty map; both count as propagated.
    fn reflects(written: &Collection, observed: Option<&Collection>) -> bool {
        if written.is_empty() && observed.is_none() {
            return true;
        }
        observed == Some(written)
    }
}
