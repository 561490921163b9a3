use chrono::{DateTime, Utc};
use shared_types::ArtifactName;

use super::backend::Collection;
use super::version_key;

/// Count-cap-plus-age-exemption rule governing which archived versions
/// survive a trim.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub max_backup_files: usize,
    pub max_backup_hours: i64,
}

impl RetentionPolicy {
    /// Select the history keys of `name` to evict, given the state of
    /// the history collection at `now`.
    ///
    /// Nothing is evicted while the count stays within the cap. Beyond
    /// the cap, only entries at least `max_backup_hours` old go; a
    /// burst of recent updates can therefore transiently hold more
    /// than `max_backup_files` entries. Keys whose timestamp cannot be
    /// parsed are present-but-opaque data and are never selected.
    pub fn select_for_eviction(
        &self,
        history: &Collection,
        name: &ArtifactName,
        now: DateTime<Utc>,
    ) -> Vec<String> {
        let keys = version_key::sorted_matching_keys(history, name);
        if keys.len() <= self.max_backup_files {
            return Vec::new();
        }
        keys.into_iter()
            .skip(self.max_backup_files)
            .filter(|key| match version_key::extract_stamp(key, name) {
                Some(stamp) => {
                    now.signed_duration_since(stamp.as_datetime()).num_hours()
                        >= self.max_backup_hours
                }
                None => false,
            })
            .collect()
    }
}
