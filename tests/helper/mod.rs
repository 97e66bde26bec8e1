#![allow(dead_code, unused_imports)]

mod storage;
mod tracking;

pub use storage::*;
pub use tracking::*;

use chrono::{DateTime, Utc};
use latest_installer::version::Candidate;

/// Candidate with an RFC 3339 modification time
pub fn candidate(key: &str, last_modified: &str) -> Candidate {
    let last_modified = DateTime::parse_from_rfc3339(last_modified)
        .unwrap()
        .with_timezone(&Utc);
    Candidate::new(key, last_modified)
}
