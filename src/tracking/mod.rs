//! Conversion tracking for resolved downloads
//!
//! Tracking runs after the winner is known and never changes the outcome:
//! every failure is logged and dropped.

#[cfg(test)]
use mockall::automock;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, error};

use crate::config::Settings;
use crate::version::error::TrackingError;

pub mod facebook;

pub use facebook::FacebookTracker;

/// Client details captured from the invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestData {
    /// First address of `x-forwarded-for`
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// Landing page that linked to the download
    pub referrer: Option<String>,
    /// Browser id cookie (`_fbp`)
    pub fbp: Option<String>,
    /// Click id cookie (`_fbc`)
    pub fbc: Option<String>,
    /// Click id from the landing page URL
    pub fbclid: Option<String>,
    pub email: Option<String>,
    /// `utm_*` invocation parameters
    pub utm_params: BTreeMap<String, String>,
}

/// The file being downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub file_name: String,
    pub file_url: String,
    /// Page where the click happened, if known
    pub source_url: Option<String>,
}

/// Trait for platforms that receive conversion events
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ConversionTracker: Send + Sync {
    /// Short platform name used in logs and results
    fn platform(&self) -> &'static str;

    /// Sends one conversion event for a download
    async fn send(&self, request: &RequestData, file: &FileInfo) -> Result<(), TrackingError>;
}

/// Trackers whose credentials are present in `settings`
pub fn configured_trackers(settings: &Settings) -> Vec<Arc<dyn ConversionTracker>> {
    let mut trackers: Vec<Arc<dyn ConversionTracker>> = Vec::new();

    match FacebookTracker::from_settings(&settings.facebook) {
        Some(tracker) => trackers.push(Arc::new(tracker)),
        None => debug!("Facebook tracking not configured, skipping"),
    }

    trackers
}

/// Send a conversion event to every tracker
///
/// Returns the platforms that accepted the event. Failures are logged and
/// never propagated.
pub async fn send_conversion_events(
    trackers: &[Arc<dyn ConversionTracker>],
    request: &RequestData,
    file: &FileInfo,
) -> Vec<&'static str> {
    let mut sent = Vec::new();

    for tracker in trackers {
        match tracker.send(request, file).await {
            Ok(()) => {
                debug!("{} event sent for {}", tracker.platform(), file.file_name);
                sent.push(tracker.platform());
            }
            Err(e) => error!("{} tracking error: {}", tracker.platform(), e),
        }
    }

    sent
}
