//! Tracking test utilities

use std::sync::Mutex;

use async_trait::async_trait;

use latest_installer::tracking::{ConversionTracker, FileInfo, RequestData};
use latest_installer::version::error::TrackingError;

/// Tracker that records every event and optionally fails or never answers
pub struct RecordingTracker {
    fail: bool,
    stall: bool,
    events: Mutex<Vec<(RequestData, FileInfo)>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self {
            fail: false,
            stall: false,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Records the event, then never completes
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<(RequestData, FileInfo)> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversionTracker for RecordingTracker {
    fn platform(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, request: &RequestData, file: &FileInfo) -> Result<(), TrackingError> {
        self.events
            .lock()
            .unwrap()
            .push((request.clone(), file.clone()));

        if self.stall {
            std::future::pending::<()>().await;
        }

        if self.fail {
            Err(TrackingError::Rejected {
                status: 503,
                body: "tracking unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
