//! Object listing for S3-compatible buckets

#[cfg(test)]
use mockall::automock;

use std::net::Ipv4Addr;
use std::sync::LazyLock;

use regex::Regex;

use crate::version::error::ListError;
use crate::version::types::Candidate;

pub mod spaces;

pub use spaces::SpacesLister;

/// 3-63 lowercase letters, digits, dots and hyphens, alphanumeric at both ends
static BUCKET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9.-]{1,61}[a-z0-9]$").unwrap());

/// Whether `name` follows the S3 bucket naming rules
///
/// Names with adjacent dots or in IPv4 address form are rejected as well, so
/// a valid name is always a plain DNS label sequence.
pub fn is_valid_bucket_name(name: &str) -> bool {
    BUCKET_NAME.is_match(name) && !name.contains("..") && name.parse::<Ipv4Addr>().is_err()
}

/// Trait for listing the objects that may be resolved as "latest"
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ObjectLister: Send + Sync {
    /// Lists every object under `prefix` in `bucket`
    ///
    /// # Returns
    /// * `Ok(Vec<Candidate>)` - Objects in the provider's listing order
    /// * `Err(ListError)` - If the listing fails
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<Candidate>, ListError>;

    /// Public URL of an object, used as the redirect location
    fn object_url(&self, bucket: &str, key: &str) -> Result<String, ListError>;
}
