//! Storage test utilities

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use latest_installer::storage::ObjectLister;
use latest_installer::version::Candidate;
use latest_installer::version::error::ListError;

/// In-memory lister keyed by bucket
pub struct MockLister {
    buckets: HashMap<String, Vec<Candidate>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLister {
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_objects(mut self, bucket: &str, objects: Vec<Candidate>) -> Self {
        self.buckets.insert(bucket.to_string(), objects);
        self
    }

    /// `(bucket, prefix)` of every listing request so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectLister for MockLister {
    async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<Candidate>, ListError> {
        self.calls
            .lock()
            .unwrap()
            .push((bucket.to_string(), prefix.to_string()));

        match self.buckets.get(bucket) {
            Some(objects) => Ok(objects
                .iter()
                .filter(|object| object.key().starts_with(prefix))
                .cloned()
                .collect()),
            None => Err(ListError::BucketNotFound(bucket.to_string())),
        }
    }

    fn object_url(&self, bucket: &str, key: &str) -> Result<String, ListError> {
        Ok(format!("https://{}.test.example/{}", bucket, key))
    }
}
