//! Invocation arguments and request data extraction

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

use crate::tracking::RequestData;

/// HTTP details forwarded by the function runtime
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpInfo {
    pub headers: HashMap<String, String>,
}

/// Arguments of one function invocation
///
/// Query parameters arrive as top-level keys next to the runtime's `http`
/// object. Unrecognized keys are kept in `extra`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InvocationArgs {
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub pattern: Option<String>,
    pub track: Option<Value>,
    pub fbp: Option<String>,
    pub fbc: Option<String>,
    pub fbclid: Option<String>,
    pub email: Option<String>,
    pub http: Option<HttpInfo>,
    /// Headers from runtimes that predate the `http` object
    #[serde(rename = "__ow_headers")]
    pub ow_headers: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl InvocationArgs {
    /// Whether `track` is present and truthy
    pub fn tracking_enabled(&self) -> bool {
        match &self.track {
            None | Some(Value::Null) => false,
            Some(Value::Bool(enabled)) => *enabled,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
        }
    }

    fn headers(&self) -> Option<&HashMap<String, String>> {
        self.http
            .as_ref()
            .map(|http| &http.headers)
            .or(self.ow_headers.as_ref())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Collect the client details used for conversion tracking
    pub fn request_data(&self) -> RequestData {
        let ip = self
            .header("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        let utm_params = self
            .extra
            .iter()
            .filter(|(key, _)| key.starts_with("utm_"))
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key.clone(), s.clone())),
                Value::Number(n) => Some((key.clone(), n.to_string())),
                _ => None,
            })
            .collect();

        RequestData {
            ip,
            user_agent: non_empty(self.header("user-agent")),
            referrer: non_empty(self.header("referer")),
            fbp: non_empty(self.fbp.as_deref()),
            fbc: non_empty(self.fbc.as_deref()),
            fbclid: non_empty(self.fbclid.as_deref()),
            email: non_empty(self.email.as_deref()),
            utm_params,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
