//! Serverless function entry point
//!
//! Lists the bucket, resolves the latest installer, optionally records a
//! conversion and answers with a redirect to the winner.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::{Settings, TRACKING_TIMEOUT_MS};
use crate::storage::{ObjectLister, is_valid_bucket_name};
use crate::tracking::{ConversionTracker, FileInfo, send_conversion_events};
use crate::version::error::ResolveError;
use crate::version::resolve_latest;

pub mod args;
pub mod response;

pub use args::InvocationArgs;
pub use response::FunctionResponse;

/// Handle one invocation
///
/// Invocation arguments override the corresponding `settings` defaults; an
/// empty bucket argument counts as absent. Tracking failures are logged and
/// never change the response, and tracking is abandoned after
/// [`TRACKING_TIMEOUT_MS`].
pub async fn handle<L>(
    args: &InvocationArgs,
    settings: &Settings,
    lister: &L,
    trackers: &[Arc<dyn ConversionTracker>],
) -> FunctionResponse
where
    L: ObjectLister + ?Sized,
{
    let Some(bucket) = args
        .bucket
        .as_deref()
        .filter(|b| !b.is_empty())
        .or(settings.bucket.as_deref().filter(|b| !b.is_empty()))
    else {
        return FunctionResponse::bad_request(
            "bucket parameter or SPACES_BUCKET environment variable required",
        );
    };
    if !is_valid_bucket_name(bucket) {
        warn!("Rejected invocation: invalid bucket name {:?}", bucket);
        return FunctionResponse::bad_request(format!("Invalid bucket name: {}", bucket));
    }
    let prefix = args.prefix.as_deref().unwrap_or(&settings.prefix);
    let pattern = args.pattern.as_deref().unwrap_or(&settings.pattern);

    let candidates = match lister.list_objects(bucket, prefix).await {
        Ok(candidates) => candidates,
        Err(e) => {
            error!("Failed to list {} under {:?}: {}", bucket, prefix, e);
            return FunctionResponse::internal_error(e.to_string());
        }
    };

    if candidates.is_empty() {
        return FunctionResponse::not_found("No files found in specified location");
    }

    let winner = match resolve_latest(&candidates, Some(pattern)) {
        Ok(Some(winner)) => winner,
        Ok(None) => {
            return FunctionResponse::not_found(format!("No files matching pattern: {}", pattern));
        }
        Err(e @ ResolveError::InvalidPattern { .. }) => {
            warn!("Rejected invocation: {}", e);
            return FunctionResponse::bad_request(e.to_string());
        }
    };

    let file_url = match lister.object_url(bucket, winner.key()) {
        Ok(url) => url,
        Err(e) => {
            error!("Failed to build URL for {}: {}", winner.key(), e);
            return FunctionResponse::internal_error(e.to_string());
        }
    };
    info!("Redirecting to {}", file_url);

    if args.tracking_enabled() {
        let request = args.request_data();
        let file = FileInfo {
            file_name: winner.key().to_string(),
            file_url: file_url.clone(),
            source_url: request.referrer.clone(),
        };
        let timeout = Duration::from_millis(TRACKING_TIMEOUT_MS);
        match tokio::time::timeout(timeout, send_conversion_events(trackers, &request, &file))
            .await
        {
            Ok(sent) => info!("Conversion events sent: {:?}", sent),
            Err(_) => warn!("Conversion tracking abandoned after {:?}", timeout),
        }
    }

    FunctionResponse::redirect(&file_url)
}
