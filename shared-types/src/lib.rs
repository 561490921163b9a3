#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Timestamp layout used in version keys and across the API.
/// UTC, second granularity, no fractional seconds; sortable only by
/// parsing, not by string comparison.
pub const STAMP_LAYOUT: &str = "%Y-%m-%dT%H-%M-%S";

/// Maximum length of an artifact name, matching the key-name limit of
/// the backing store.
pub const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("artifact names must be between 1 and 253 characters long")]
    Length,
    #[error("artifact names may contain only ASCII letters, digits, '-', '_' and '.'")]
    Charset,
}

/// Validated identifier for a configuration artifact, e.g.
/// "prometheus.yml" or "myrules.rules".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(NameError::Length);
        }
        let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
        if !name.chars().all(allowed) {
            return Err(NameError::Charset);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StampError {
    #[error("version timestamps may contain only digits, '-' and 'T'")]
    Charset,
    #[error("version timestamp does not match layout YYYY-MM-DDThh-mm-ss")]
    Layout,
}

/// UTC timestamp of an archived version, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionStamp(DateTime<Utc>);

impl VersionStamp {
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(t: DateTime<Utc>) -> Self {
        Self(t.trunc_subsecs(0))
    }

    /// Parse a stamp in the fixed layout. A permissive character-class
    /// check runs first so obviously foreign input is rejected before
    /// the layout parse.
    pub fn parse(s: &str) -> Result<Self, StampError> {
        if !s.chars().all(|c| c.is_ascii_digit() || c == '-' || c == 'T') {
            return Err(StampError::Charset);
        }
        let naive =
            NaiveDateTime::parse_from_str(s, STAMP_LAYOUT).map_err(|_| StampError::Layout)?;
        Ok(Self(naive.and_utc()))
    }

    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(STAMP_LAYOUT))
    }
}
