//! Semantic version extraction from object keys

use std::sync::LazyLock;

use regex::Regex;

use crate::version::types::ExtractedVersion;

/// Optional `v`/`V` prefix followed by three dot-separated numeric groups
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[vV]?(\d+)\.(\d+)\.(\d+)").unwrap());

/// Extract the first usable `major.minor.patch` token from a key
///
/// Two-component tokens such as `1.2` are not versions. Leading zeros are
/// read as decimal (`01` is `1`). A token whose components overflow `u64` is
/// skipped in favour of the next one; with no other token the result is `None`.
///
/// Examples:
/// - "installer-v2.10.0.exe" -> 2.10.0
/// - "app-1.2.3.4.zip" -> 1.2.3
/// - "installer-latest.exe" -> None
pub fn extract_version(key: &str) -> Option<ExtractedVersion> {
    VERSION_TOKEN.captures_iter(key).find_map(|captures| {
        let component = |index: usize| captures.get(index)?.as_str().parse::<u64>().ok();

        Some(ExtractedVersion {
            major: component(1)?,
            minor: component(2)?,
            patch: component(3)?,
            raw: captures.get(0)?.as_str().to_string(),
        })
    })
}
