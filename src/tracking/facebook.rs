//! Facebook Conversions API tracker implementation

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::{
    CONNECT_TIMEOUT_MS, EVENT_ID_WINDOW_SECS, FacebookSettings, GRAPH_API_VERSION,
    TRACKING_TIMEOUT_MS,
};
use crate::tracking::{ConversionTracker, FileInfo, RequestData};
use crate::version::error::TrackingError;

#[derive(Debug, Serialize)]
struct EventRequest {
    data: Vec<ServerEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_event_code: Option<String>,
}

#[derive(Debug, Serialize)]
struct ServerEvent {
    event_name: String,
    event_time: i64,
    event_id: String,
    event_source_url: String,
    action_source: &'static str,
    user_data: UserData,
    custom_data: CustomData,
}

#[derive(Debug, Serialize)]
struct UserData {
    #[serde(skip_serializing_if = "Option::is_none")]
    client_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fbp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fbc: Option<String>,
    /// SHA-256 hashed emails
    #[serde(skip_serializing_if = "Vec::is_empty")]
    em: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CustomData {
    content_name: String,
    value: f64,
    currency: &'static str,
    #[serde(flatten)]
    custom_properties: BTreeMap<String, String>,
}

/// Tracker that posts server-side events to the Facebook Conversions API
pub struct FacebookTracker {
    client: reqwest::Client,
    graph_url: String,
    pixel_id: String,
    access_token: String,
    event_name: String,
    test_event_code: Option<String>,
}

impl FacebookTracker {
    /// Creates a tracker posting to `{graph_url}/{version}/{pixel_id}/events`
    pub fn new(graph_url: &str, pixel_id: &str, access_token: &str, event_name: &str) -> Self {
        Self {
            client: http_client(Duration::from_millis(TRACKING_TIMEOUT_MS)),
            graph_url: graph_url.trim_end_matches('/').to_string(),
            pixel_id: pixel_id.to_string(),
            access_token: access_token.to_string(),
            event_name: event_name.to_string(),
            test_event_code: None,
        }
    }

    /// Replaces the total per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Marks events as test events in Events Manager
    pub fn with_test_event_code(mut self, code: &str) -> Self {
        self.test_event_code = Some(code.to_string());
        self
    }

    /// Returns `None` unless both the pixel id and access token are set
    pub fn from_settings(settings: &FacebookSettings) -> Option<Self> {
        let pixel_id = settings.pixel_id.as_deref()?;
        let access_token = settings.access_token.as_deref()?;

        let tracker = Self::new(
            &settings.graph_url,
            pixel_id,
            access_token,
            &settings.event_name,
        );

        Some(match &settings.test_event_code {
            Some(code) => tracker.with_test_event_code(code),
            None => tracker,
        })
    }

    fn build_request(
        &self,
        request: &RequestData,
        file: &FileInfo,
        now: DateTime<Utc>,
    ) -> EventRequest {
        let fbc = request.fbc.clone().or_else(|| {
            request
                .fbclid
                .as_ref()
                .map(|fbclid| format!("fb.1.{}.{}", now.timestamp_millis(), fbclid))
        });

        let event = ServerEvent {
            event_name: self.event_name.clone(),
            event_time: now.timestamp(),
            event_id: generate_event_id(request.ip.as_deref(), &file.file_url, now),
            event_source_url: file
                .source_url
                .clone()
                .unwrap_or_else(|| file.file_url.clone()),
            action_source: "website",
            user_data: UserData {
                client_ip_address: request.ip.clone(),
                client_user_agent: request.user_agent.clone(),
                fbp: request.fbp.clone(),
                fbc,
                em: request.email.as_deref().map(hash_value).into_iter().collect(),
            },
            custom_data: CustomData {
                content_name: file.file_name.clone(),
                value: 1.0,
                currency: "USD",
                custom_properties: request.utm_params.clone(),
            },
        };

        EventRequest {
            data: vec![event],
            test_event_code: self.test_event_code.clone(),
        }
    }

    fn events_url(&self) -> Result<Url, TrackingError> {
        let base = format!(
            "{}/{}/{}/events",
            self.graph_url, GRAPH_API_VERSION, self.pixel_id
        );
        Url::parse_with_params(&base, &[("access_token", self.access_token.as_str())])
            .map_err(|e| TrackingError::InvalidEndpoint(format!("{}: {}", self.graph_url, e)))
    }
}

#[async_trait::async_trait]
impl ConversionTracker for FacebookTracker {
    fn platform(&self) -> &'static str {
        "facebook"
    }

    async fn send(&self, request: &RequestData, file: &FileInfo) -> Result<(), TrackingError> {
        let body = self.build_request(request, file, Utc::now());

        let response = self.client.post(self.events_url()?).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Conversions API returned status {}: {}", status, body);
            return Err(TrackingError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            "Conversions API accepted event for pixel {}: {}",
            self.pixel_id,
            response.text().await.unwrap_or_default()
        );

        Ok(())
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent("latest-installer")
        .timeout(timeout)
        .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS).min(timeout))
        .build()
        .expect("Failed to create HTTP client")
}

/// Hash a value with SHA-256 after trimming and lower-casing it
pub fn hash_value(value: &str) -> String {
    hex::encode(Sha256::digest(value.trim().to_lowercase().as_bytes()))
}

/// Deterministic event id shared by downloads of the same file from the same
/// address within one window, so duplicate events are merged.
pub fn generate_event_id(ip: Option<&str>, file_url: &str, now: DateTime<Utc>) -> String {
    let window = now.timestamp().div_euclid(EVENT_ID_WINDOW_SECS);
    let combined = format!("{}:{}:{}", ip.unwrap_or_default(), file_url, window);
    hex::encode(Sha256::digest(combined.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn request() -> RequestData {
        RequestData {
            ip: Some("203.0.113.7".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referrer: Some("https://example.com/landing".to_string()),
            fbp: Some("fb.1.1700000000000.111".to_string()),
            fbc: None,
            fbclid: None,
            email: Some(" Test@Test.com ".to_string()),
            utm_params: BTreeMap::from([
                ("utm_campaign".to_string(), "spring".to_string()),
                ("utm_source".to_string(), "newsletter".to_string()),
            ]),
        }
    }

    fn file() -> FileInfo {
        FileInfo {
            file_name: "installers/app-v2.0.0.exe".to_string(),
            file_url: "https://downloads.nyc3.digitaloceanspaces.com/installers/app-v2.0.0.exe"
                .to_string(),
            source_url: Some("https://example.com/landing".to_string()),
        }
    }

    #[test]
    fn hash_value_normalizes_before_hashing() {
        assert_eq!(hash_value(" Test@Test.com "), hash_value("test@test.com"));
        assert_eq!(
            hash_value("test@test.com"),
            "f660ab912ec121d1b1e928a0bb4bc61b15f5ad44d5efdc4e1c92a25e99b8e44a"
        );
    }

    #[test]
    fn generate_event_id_is_stable_within_a_minute() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 59).unwrap();
        let next_minute = Utc.with_ymd_and_hms(2024, 5, 1, 10, 1, 0).unwrap();

        let id = generate_event_id(Some("1.2.3.4"), "https://x/app.exe", start);

        assert_eq!(id, generate_event_id(Some("1.2.3.4"), "https://x/app.exe", later));
        assert_ne!(
            id,
            generate_event_id(Some("1.2.3.4"), "https://x/app.exe", next_minute)
        );
        assert_ne!(id, generate_event_id(Some("5.6.7.8"), "https://x/app.exe", start));
    }

    #[test]
    fn build_request_produces_conversions_api_payload() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let tracker = FacebookTracker::new("https://graph.facebook.com", "1234", "token", "Lead")
            .with_test_event_code("TEST42");

        let payload = serde_json::to_value(tracker.build_request(&request(), &file(), now)).unwrap();

        assert_eq!(
            payload,
            json!({
                "data": [{
                    "event_name": "Lead",
                    "event_time": 1714557600,
                    "event_id": generate_event_id(Some("203.0.113.7"), &file().file_url, now),
                    "event_source_url": "https://example.com/landing",
                    "action_source": "website",
                    "user_data": {
                        "client_ip_address": "203.0.113.7",
                        "client_user_agent": "Mozilla/5.0",
                        "fbp": "fb.1.1700000000000.111",
                        "em": [hash_value("test@test.com")]
                    },
                    "custom_data": {
                        "content_name": "installers/app-v2.0.0.exe",
                        "value": 1.0,
                        "currency": "USD",
                        "utm_campaign": "spring",
                        "utm_source": "newsletter"
                    }
                }],
                "test_event_code": "TEST42"
            })
        );
    }

    #[test]
    fn build_request_falls_back_to_file_url_and_derives_fbc() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let tracker = FacebookTracker::new("https://graph.facebook.com", "1234", "token", "Lead");
        let request = RequestData {
            fbclid: Some("AbC123".to_string()),
            ..RequestData::default()
        };
        let file = FileInfo {
            source_url: None,
            ..file()
        };

        let payload = serde_json::to_value(tracker.build_request(&request, &file, now)).unwrap();
        let event = &payload["data"][0];

        assert_eq!(event["event_source_url"], json!(file.file_url));
        assert_eq!(event["user_data"], json!({ "fbc": "fb.1.1714557600000.AbC123" }));
        assert!(payload.get("test_event_code").is_none());
    }

    #[test]
    fn from_settings_requires_credentials() {
        let settings = FacebookSettings {
            pixel_id: Some("1234".to_string()),
            ..FacebookSettings::default()
        };

        assert!(FacebookTracker::from_settings(&settings).is_none());
    }

    #[tokio::test]
    async fn send_posts_event_to_pixel_endpoint() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/v21.0/1234/events")
            .match_query(Matcher::UrlEncoded("access_token".into(), "token".into()))
            .match_body(Matcher::PartialJson(json!({
                "data": [{
                    "event_name": "Download",
                    "action_source": "website",
                    "custom_data": { "content_name": "installers/app-v2.0.0.exe" }
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"events_received": 1, "fbtrace_id": "abc"}"#)
            .create_async()
            .await;

        let tracker = FacebookTracker::new(&server.url(), "1234", "token", "Download");
        let result = tracker.send(&request(), &file()).await;

        mock.assert_async().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn send_returns_rejected_for_error_status() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/v21.0/1234/events")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": {"message": "Invalid OAuth access token."}}"#)
            .create_async()
            .await;

        let tracker = FacebookTracker::new(&server.url(), "1234", "bad", "Lead");
        let result = tracker.send(&request(), &file()).await;

        mock.assert_async().await;
        assert!(matches!(
            result,
            Err(TrackingError::Rejected { status: 400, ref body }) if body.contains("OAuth")
        ));
    }

    #[tokio::test]
    async fn send_times_out_when_endpoint_never_answers() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let tracker = FacebookTracker::new(&format!("http://{}", addr), "123", "token", "Lead")
            .with_timeout(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = tracker.send(&request(), &file()).await;

        assert!(matches!(result, Err(TrackingError::Network(ref e)) if e.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(2));
        server.abort();
    }
}
