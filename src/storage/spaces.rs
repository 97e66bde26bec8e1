//! DigitalOcean Spaces (S3 `ListObjectsV2`) lister implementation

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{CONNECT_TIMEOUT_MS, LIST_TIMEOUT_MS, Settings};
use crate::storage::{ObjectLister, is_valid_bucket_name};
use crate::version::error::ListError;
use crate::version::types::Candidate;

/// One page of a `ListObjectsV2` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListBucketResult {
    #[serde(default)]
    contents: Vec<ObjectEntry>,
    #[serde(default)]
    is_truncated: bool,
    next_continuation_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ObjectEntry {
    key: String,
    last_modified: DateTime<Utc>,
}

/// Lister for DigitalOcean Spaces and other S3-compatible endpoints
///
/// Requests are unsigned, so the bucket must allow public listing.
pub struct SpacesLister {
    client: reqwest::Client,
    region: String,
    endpoint: Option<String>,
}

impl SpacesLister {
    /// Creates a lister for the DigitalOcean Spaces endpoint of `region`
    pub fn new(region: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("latest-installer")
                .timeout(Duration::from_millis(LIST_TIMEOUT_MS))
                .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            region: region.to_string(),
            endpoint: None,
        }
    }

    /// Creates a lister against a custom endpoint using path-style URLs
    pub fn with_endpoint(endpoint: &str, region: &str) -> Self {
        Self {
            endpoint: Some(endpoint.to_string()),
            ..Self::new(region)
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        match &settings.endpoint {
            Some(endpoint) => Self::with_endpoint(endpoint, &settings.region),
            None => Self::new(&settings.region),
        }
    }

    /// Root URL of `bucket`, with the bucket as host label or first path segment
    fn bucket_url(&self, bucket: &str) -> Result<Url, ListError> {
        if !is_valid_bucket_name(bucket) {
            return Err(ListError::InvalidBucket(bucket.to_string()));
        }

        match &self.endpoint {
            Some(endpoint) => {
                let mut url = Url::parse(endpoint)
                    .map_err(|e| ListError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
                url.path_segments_mut()
                    .map_err(|_| ListError::InvalidEndpoint(endpoint.clone()))?
                    .pop_if_empty()
                    .push(bucket);
                Ok(url)
            }
            None => {
                let host = format!("{}.{}.digitaloceanspaces.com", bucket, self.region);
                let mut url = Url::parse("https://digitaloceanspaces.com/")
                    .map_err(|e| ListError::InvalidEndpoint(e.to_string()))?;
                url.set_host(Some(&host))
                    .map_err(|e| ListError::InvalidEndpoint(format!("{}: {}", host, e)))?;
                if url.host_str() != Some(host.to_ascii_lowercase().as_str()) {
                    return Err(ListError::InvalidEndpoint(host));
                }
                Ok(url)
            }
        }
    }

    fn list_url(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<Url, ListError> {
        let mut url = self.bucket_url(bucket)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("list-type", "2");
            query.append_pair("prefix", prefix);
            if let Some(token) = continuation_token {
                query.append_pair("continuation-token", token);
            }
        }

        Ok(url)
    }

    async fn fetch_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListBucketResult, ListError> {
        let url = self.list_url(bucket, prefix, continuation_token)?;

        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ListError::BucketNotFound(bucket.to_string()));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ListError::AccessDenied(bucket.to_string()));
        }

        if !status.is_success() {
            warn!("Spaces returned status {}: {}", status, url);
            return Err(ListError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response.text().await?;

        quick_xml::de::from_str(&body).map_err(|e| {
            warn!("Failed to parse ListObjectsV2 response: {}", e);
            ListError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl ObjectLister for SpacesLister {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<Candidate>, ListError> {
        let mut candidates = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .fetch_page(bucket, prefix, continuation_token.as_deref())
                .await?;

            candidates.extend(
                page.contents
                    .into_iter()
                    .map(|entry| Candidate::new(entry.key, entry.last_modified)),
            );

            match (page.is_truncated, page.next_continuation_token) {
                (true, Some(token)) => continuation_token = Some(token),
                _ => break,
            }
        }

        debug!(
            "Listed {} objects in {} under {:?}",
            candidates.len(),
            bucket,
            prefix
        );

        Ok(candidates)
    }

    /// Each `/`-separated part of `key` becomes one percent-encoded path segment
    fn object_url(&self, bucket: &str, key: &str) -> Result<String, ListError> {
        let mut url = self.bucket_url(bucket)?;

        url.path_segments_mut()
            .map_err(|_| ListError::InvalidEndpoint(bucket.to_string()))?
            .pop_if_empty()
            .extend(key.split('/'));

        Ok(url.to_string())
    }
}
