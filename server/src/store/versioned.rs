use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use shared_types::{ArtifactName, VersionStamp};

use super::adapter::CollectionClient;
use super::backend::{Collection, KeyValueBackend};
use super::config::{CollectionPair, StoreConfig};
use super::error::StoreError;
use super::retention::RetentionPolicy;
use super::version_key;
use crate::validate::{Validator, Verdict};

/// Outcome of a `put`, distinguished for caller messaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No prior value existed.
    Created,
    /// The prior value was archived and replaced.
    Updated,
    /// Byte-for-byte identical to the current value; nothing written.
    Unchanged,
    /// Rejected by the validator; nothing written.
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// The versioned configuration store: current values in one backend
/// collection, a bounded time-ordered history of prior versions in a
/// second, paired collection.
///
/// There is no locking and the backend offers no compare-and-swap, so
/// two concurrent writers to the same artifact race read-modify-write
/// style; the last commit wins and both may archive the same prior
/// value. Every operation re-fetches the collections; nothing is
/// cached across calls.
pub struct VersionedStore {
    client: CollectionClient,
    validator: Arc<dyn Validator>,
    retention: RetentionPolicy,
    collections: CollectionPair,
}

impl VersionedStore {
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        validator: Arc<dyn Validator>,
        config: StoreConfig,
        collections: CollectionPair,
    ) -> Self {
        Self {
            client: CollectionClient::new(
                backend,
                config.confirm_poll_interval,
                config.confirm_timeout,
            ),
            validator,
            retention: RetentionPolicy {
                max_backup_files: config.max_backup_files,
                max_backup_hours: config.max_backup_hours,
            },
            collections,
        }
    }

    pub async fn get_current(&self, name: &ArtifactName) -> Result<String, StoreError> {
        let current = self.fetch_current().await?;
        current
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Names of all current artifacts in this group, sorted.
    pub async fn list_artifacts(&self) -> Result<Vec<String>, StoreError> {
        let current = self.fetch_current().await?;
        let mut names: Vec<String> = current.into_keys().collect();
        names.sort();
        Ok(names)
    }

    /// Archived version stamps for `name`, most recent first. History
    /// keys without a parseable stamp are left out.
    pub async fn list_versions(
        &self,
        name: &ArtifactName,
    ) -> Result<Vec<VersionStamp>, StoreError> {
        let history = self.fetch_history().await?;
        Ok(version_key::sorted_matching_keys(&history, name)
            .iter()
            .filter_map(|key| version_key::extract_stamp(key, name))
            .collect())
    }

    pub async fn get_version(
        &self,
        name: &ArtifactName,
        stamp: &str,
    ) -> Result<String, StoreError> {
        let stamp = VersionStamp::parse(stamp)?;
        let history = self.fetch_history().await?;
        let key = version_key::encode(name, stamp);
        history
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key))
    }

    /// The validate-then-commit update protocol.
    ///
    /// History is committed before current so current never claims an
    /// archive that was not written. The reverse failure (history
    /// committed, current write failed) leaves an orphaned backup; it
    /// is surfaced to the caller and deliberately not rolled back.
    pub async fn put(
        &self,
        name: &ArtifactName,
        content: &str,
    ) -> Result<UpdateOutcome, StoreError> {
        match self
            .validator
            .validate(content.as_bytes())
            .await
            .map_err(StoreError::Validator)?
        {
            Verdict::Rejected(diagnostics) => {
                info!(%name, "update rejected by validator");
                return Ok(UpdateOutcome::Invalid(diagnostics));
            }
            Verdict::Accepted => {}
        }

        let mut current = self.fetch_current().await?;
        let mut history = self.fetch_history().await?;

        let Some(previous) = current.get(name.as_str()).cloned() else {
            // First version of this artifact; history stays untouched.
            current.insert(name.to_string(), content.to_string());
            self.client
                .commit(&self.collections.current, current)
                .await?;
            info!(%name, "created");
            return Ok(UpdateOutcome::Created);
        };

        if previous == content {
            debug!(%name, "identical to current value, nothing to do");
            return Ok(UpdateOutcome::Unchanged);
        }

        let now = Utc::now();
        let backup_key = version_key::encode(name, VersionStamp::from_datetime(now));
        history.insert(backup_key, previous);

        // The backend has limited space per collection; trim expired
        // backups while we hold the updated map.
        for stale in self.retention.select_for_eviction(&history, name, now) {
            debug!(%name, key = %stale, "evicting expired backup");
            history.remove(&stale);
        }

        self.client
            .commit(&self.collections.history, history)
            .await?;

        current.insert(name.to_string(), content.to_string());
        self.client
            .commit(&self.collections.current, current)
            .await?;
        info!(%name, "updated, previous value archived");
        Ok(UpdateOutcome::Updated)
    }

    /// Remove the current value and every archived version of `name`.
    ///
    /// Two independent commits, current first; if the history commit
    /// fails the orphaned backups survive until retried out of band.
    pub async fn delete(&self, name: &ArtifactName) -> Result<DeleteOutcome, StoreError> {
        let mut current = self.fetch_current().await?;
        if current.remove(name.as_str()).is_none() {
            return Ok(DeleteOutcome::NotFound);
        }
        self.client
            .commit(&self.collections.current, current)
            .await?;

        let mut history = self.fetch_history().await?;
        let matching = version_key::sorted_matching_keys(&history, name);
        for key in &matching {
            history.remove(key);
        }
        self.client
            .commit(&self.collections.history, history)
            .await?;
        info!(%name, backups = matching.len(), "deleted with all archived versions");
        Ok(DeleteOutcome::Deleted)
    }

    async fn fetch_current(&self) -> Result<Collection, StoreError> {
        Ok(self
            .client
            .fetch(&self.collections.current)
            .await?
            .unwrap_or_default())
    }

    async fn fetch_history(&self) -> Result<Collection, StoreError> {
        Ok(self
            .client
            .fetch(&self.collections.history)
            .await?
            .unwrap_or_default())
    }
}
