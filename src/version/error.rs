use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid bucket name: {0}")]
    InvalidBucket(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Access denied to bucket: {0}")]
    AccessDenied(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Event rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
