//! Latest version resolver
//!
//! Runs the filter, extraction and ranking stages over a candidate listing:
//!
//! ```text
//! candidates ──▶ filter ──▶ extract ──▶ rank ──▶ Winner | None
//!                  │
//!                  └──▶ InvalidPattern
//! ```

use tracing::debug;

use crate::version::error::ResolveError;
use crate::version::extract::extract_version;
use crate::version::filter::filter_candidates;
use crate::version::rank::{RankingInput, pick, rank};
use crate::version::types::{Candidate, Winner};

/// Select the latest candidate from a listing
///
/// # Arguments
/// * `candidates` - Objects in listing order
/// * `pattern` - Optional regular expression a key must contain a match for
///
/// # Returns
/// * `Ok(Some(Winner))` - The selected candidate
/// * `Ok(None)` - Nothing survived filtering, or the listing was empty
/// * `Err(ResolveError::InvalidPattern)` - `pattern` failed to compile; nothing was ranked
pub fn resolve_latest(
    candidates: &[Candidate],
    pattern: Option<&str>,
) -> Result<Option<Winner>, ResolveError> {
    let filtered = filter_candidates(candidates, pattern)?;
    debug!(
        "{} of {} candidates match pattern {:?}",
        filtered.len(),
        candidates.len(),
        pattern
    );

    let inputs = filtered
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| RankingInput {
            index,
            candidate,
            version: extract_version(candidate.key()),
        })
        .collect();

    let winner = pick(rank(inputs));
    if let Some(winner) = &winner {
        debug!(
            "Resolved latest candidate {} (version: {:?})",
            winner.key(),
            winner.version.as_ref().map(|v| v.raw.as_str())
        );
    }

    Ok(winner)
}
