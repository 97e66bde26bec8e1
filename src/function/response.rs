//! Function responses understood by the serverless runtime

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response returned to the runtime, serialized as
/// `{"statusCode": .., "headers": {..}, "body": {..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<ErrorBody>,
}

impl FunctionResponse {
    /// 302 redirect to `location`
    pub fn redirect(location: &str) -> Self {
        Self {
            status_code: 302,
            headers: BTreeMap::from([("Location".to_string(), location.to_string())]),
            body: None,
        }
    }

    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body: Some(ErrorBody {
                error: message.into(),
            }),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::error(400, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(404, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::error(500, message)
    }

    /// Redirect target, if this is a redirect
    pub fn location(&self) -> Option<&str> {
        self.headers.get("Location").map(String::as_str)
    }
}
