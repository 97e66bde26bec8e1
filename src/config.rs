use serde::Deserialize;
use serde_json::{Map, Value};

// =============================================================================
// Defaults
// =============================================================================

/// Spaces region used when `SPACES_REGION` is unset
pub const DEFAULT_REGION: &str = "nyc3";

/// Pattern used when neither the invocation nor `FILE_PATTERN` supplies one
pub const DEFAULT_FILE_PATTERN: &str = ".*";

/// Conversion event name used when `FB_EVENT_NAME` is unset
pub const DEFAULT_EVENT_NAME: &str = "Lead";

/// Base URL of the Facebook Graph API
pub const DEFAULT_GRAPH_URL: &str = "https://graph.facebook.com";

/// Graph API version for the Conversions API endpoint
pub const GRAPH_API_VERSION: &str = "v21.0";

/// Total timeout for one bucket listing request in milliseconds (10 seconds)
pub const LIST_TIMEOUT_MS: u64 = 10_000;

/// Total timeout for one conversion event request in milliseconds (3 seconds)
pub const TRACKING_TIMEOUT_MS: u64 = 3_000;

/// Timeout for establishing any outbound connection in milliseconds (2 seconds)
pub const CONNECT_TIMEOUT_MS: u64 = 2_000;

/// Width of the window in which repeated downloads share an event id (1 minute)
pub const EVENT_ID_WINDOW_SECS: i64 = 60;

/// Environment variables read by [`Settings::from_env`]
const VARIABLES: &[&str] = &[
    "SPACES_BUCKET",
    "SPACES_PREFIX",
    "FILE_PATTERN",
    "SPACES_REGION",
    "SPACES_ENDPOINT",
    "FB_PIXEL_ID",
    "FB_ACCESS_TOKEN",
    "FB_EVENT_NAME",
    "FB_TEST_EVENT_CODE",
    "FB_GRAPH_URL",
];

/// Process-wide defaults, overridable per invocation
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "SPACES_BUCKET")]
    pub bucket: Option<String>,
    #[serde(rename = "SPACES_PREFIX")]
    pub prefix: String,
    #[serde(rename = "FILE_PATTERN")]
    pub pattern: String,
    #[serde(rename = "SPACES_REGION")]
    pub region: String,
    /// Replaces `https://{region}.digitaloceanspaces.com` for listing requests
    #[serde(rename = "SPACES_ENDPOINT")]
    pub endpoint: Option<String>,
    #[serde(flatten)]
    pub facebook: FacebookSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bucket: None,
            prefix: String::new(),
            pattern: DEFAULT_FILE_PATTERN.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            facebook: FacebookSettings::default(),
        }
    }
}

/// Facebook Conversions API configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FacebookSettings {
    #[serde(rename = "FB_PIXEL_ID")]
    pub pixel_id: Option<String>,
    #[serde(rename = "FB_ACCESS_TOKEN")]
    pub access_token: Option<String>,
    #[serde(rename = "FB_EVENT_NAME")]
    pub event_name: String,
    #[serde(rename = "FB_TEST_EVENT_CODE")]
    pub test_event_code: Option<String>,
    #[serde(rename = "FB_GRAPH_URL")]
    pub graph_url: String,
}

impl Default for FacebookSettings {
    fn default() -> Self {
        Self {
            pixel_id: None,
            access_token: None,
            event_name: DEFAULT_EVENT_NAME.to_string(),
            test_event_code: None,
            graph_url: DEFAULT_GRAPH_URL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, serde_json::Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, serde_json::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars: Map<String, Value> = VARIABLES
            .iter()
            .filter_map(|name| {
                lookup(name)
                    .filter(|value| !value.is_empty())
                    .map(|value| (name.to_string(), Value::String(value)))
            })
            .collect();

        serde_json::from_value(Value::Object(vars))
    }
}
