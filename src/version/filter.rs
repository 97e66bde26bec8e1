//! Pattern filtering of candidate keys

use regex::Regex;

use crate::version::error::ResolveError;
use crate::version::types::Candidate;

/// Keep the candidates whose key contains a match for `pattern`
///
/// An absent or empty pattern keeps every candidate. The pattern is matched
/// anywhere in the key, so `\.exe$` selects by extension.
pub fn filter_candidates<'a>(
    candidates: &'a [Candidate],
    pattern: Option<&str>,
) -> Result<Vec<&'a Candidate>, ResolveError> {
    let Some(pattern) = pattern.filter(|p| !p.is_empty()) else {
        return Ok(candidates.iter().collect());
    };

    let regex = Regex::new(pattern).map_err(|source| ResolveError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(candidates
        .iter()
        .filter(|candidate| regex.is_match(candidate.key()))
        .collect())
}
