//! Common types shared by the resolution pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A storage object under consideration for "latest" selection
///
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    key: String,
    last_modified: DateTime<Utc>,
}

impl Candidate {
    pub fn new(key: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            last_modified,
        }
    }

    /// Full object path within the bucket
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }
}

/// A `major.minor.patch` token found inside an object key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// The exact substring that matched, including any `v` prefix
    pub raw: String,
}

impl ExtractedVersion {
    /// Comparable form of this version. Ignores `raw`, so `v1.2.3` and
    /// `1.2.3` compare equal.
    pub fn as_semver(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

/// The candidate selected as "latest", with the version that decided it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner {
    pub candidate: Candidate,
    /// `None` when the winner was chosen by modification time
    pub version: Option<ExtractedVersion>,
}

impl Winner {
    pub fn key(&self) -> &str {
        self.candidate.key()
    }
}
