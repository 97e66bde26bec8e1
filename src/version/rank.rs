//! Candidate ranking
//!
//! Candidates carrying a version token always outrank candidates without
//! one. Versioned candidates are ordered by `(major, minor, patch)`, then by
//! modification time; unversioned candidates by modification time alone.
//! Remaining ties keep the original listing order.

use std::cmp::Ordering;

use crate::version::types::{Candidate, ExtractedVersion, Winner};

/// A filtered candidate annotated with its listing position and version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingInput<'a> {
    pub index: usize,
    pub candidate: &'a Candidate,
    pub version: Option<ExtractedVersion>,
}

/// Sort candidates best first
pub fn rank(mut inputs: Vec<RankingInput<'_>>) -> Vec<RankingInput<'_>> {
    inputs.sort_by(compare);
    inputs
}

/// Take the best ranked candidate, or `None` when nothing is left
pub fn pick(ranked: Vec<RankingInput<'_>>) -> Option<Winner> {
    ranked.into_iter().next().map(|best| Winner {
        candidate: best.candidate.clone(),
        version: best.version,
    })
}

fn compare(a: &RankingInput<'_>, b: &RankingInput<'_>) -> Ordering {
    let newest_first = || {
        b.candidate
            .last_modified()
            .cmp(&a.candidate.last_modified())
    };

    let by_signal = match (&a.version, &b.version) {
        (Some(va), Some(vb)) => vb.as_semver().cmp(&va.as_semver()).then_with(newest_first),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => newest_first(),
    };

    by_signal.then_with(|| a.index.cmp(&b.index))
}
