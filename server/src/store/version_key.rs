//! Codec for history keys of the form `{baseName}-{timestamp}`.

use shared_types::{ArtifactName, VersionStamp};

use super::backend::Collection;

/// Compose the history key for one archived version.
pub fn encode(name: &ArtifactName, stamp: VersionStamp) -> String {
    format!("{name}-{stamp}")
}

/// `true` when `key` belongs to `name`'s history.
///
/// Literal prefix test with no separator-boundary check: the name
/// "foo" matches "foobar-..." keys too. Existing history collections
/// were written under this rule, so it is kept as-is; base names must
/// be chosen to avoid prefix overlap.
pub fn matches(key: &str, name: &ArtifactName) -> bool {
    key.starts_with(name.as_str())
}

/// Recover the stamp from a history key by stripping the `{name}-`
/// prefix. Returns `None` for foreign or unparseable keys; callers
/// keep such keys out of time-ordered operations but never destroy
/// them.
pub fn extract_stamp(key: &str, name: &ArtifactName) -> Option<VersionStamp> {
    let rest = key.strip_prefix(name.as_str())?.strip_prefix('-')?;
    VersionStamp::parse(rest).ok()
}

/// All keys in `history` matching `name`, most recent first.
/// Unparseable keys sort last; timestamp ties break on the full key so
/// repeated runs see the same order.
pub fn sorted_matching_keys(history: &Collection, name: &ArtifactName) -> Vec<String> {
    let mut keys: Vec<(Option<VersionStamp>, String)> = history
        .keys()
        .filter(|key| matches(key, name))
        .map(|key| (extract_stamp(key, name), key.clone()))
        .collect();
    keys.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    keys.into_iter().map(|(_, key)| key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ArtifactName {
        ArtifactName::new(s).unwrap()
    }

    fn history(keys: &[&str]) -> Collection {
        keys.iter().map(|k| (k.to_string(), String::new())).collect()
    }

    #[test]
    fn test_encode_and_extract() {
        let n = name("a.rules");
        let stamp = VersionStamp::parse("2024-03-09T17-04-05").unwrap();
        let key = encode(&n, stamp);
        assert_eq!(key, "a.rules-2024-03-09T17-04-05");
        assert_eq!(extract_stamp(&key, &n), Some(stamp));
    }

    #[test]
    fn test_extract_rejects_foreign_keys() {
        let n = name("a.rules");
        assert_eq!(extract_stamp("b.rules-2024-03-09T17-04-05", &n), None);
        assert_eq!(extract_stamp("a.rules-not-a-timestamp", &n), None);
        assert_eq!(extract_stamp("a.rules", &n), None);
    }

    #[test]
    fn test_matches_is_prefix_only() {
        // Known gap: a base name that prefixes another collides.
        assert!(matches("foo-2024-03-09T17-04-05", &name("foo")));
        assert!(matches("foobar-2024-03-09T17-04-05", &name("foo")));
        assert!(!matches("bar-2024-03-09T17-04-05", &name("foo")));
    }

    #[test]
    fn test_sorted_keys_most_recent_first() {
        let n = name("a.rules");
        let h = history(&[
            "a.rules-2024-03-09T00-00-00",
            "a.rules-2024-03-11T00-00-00",
            "a.rules-2024-03-10T00-00-00",
            "other.rules-2024-03-12T00-00-00",
        ]);
        assert_eq!(
            sorted_matching_keys(&h, &n),
            vec![
                "a.rules-2024-03-11T00-00-00",
                "a.rules-2024-03-10T00-00-00",
                "a.rules-2024-03-09T00-00-00",
            ]
        );
    }

    #[test]
    fn test_unparseable_keys_sort_last() {
        let n = name("a.rules");
        let h = history(&[
            "a.rules-garbage",
            "a.rules-2024-03-10T00-00-00",
            "a.rules-2024-03-09T00-00-00",
        ]);
        let sorted = sorted_matching_keys(&h, &n);
        assert_eq!(sorted.last().map(String::as_str), Some("a.rules-garbage"));
    }

    #[test]
    fn test_sort_is_deterministic_on_ties() {
        let n = name("a.rules");
        // Keys without a parseable stamp tie; order falls back to the
        // full key so repeated runs agree.
        let h = history(&[
            "a.rules-zzz",
            "a.rules-aaa",
            "a.rules-2024-03-10T00-00-00",
        ]);
        let sorted = sorted_matching_keys(&h, &n);
        assert_eq!(
            sorted,
            vec!["a.rules-2024-03-10T00-00-00", "a.rules-aaa", "a.rules-zzz"]
        );
    }
}
