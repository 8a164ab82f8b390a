//! The request/response pair an edge runtime hands to the resolver.
//!
//! Headers follow the CloudFront shape: keyed by lowercase name, each entry
//! a list of `{"key": "Canonical-Name", "value": "..."}` pairs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Headers = BTreeMap<String, Vec<HeaderEntry>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRequest {
    /// Path only, without host or query string.
    pub uri: String,
    pub method: String,
    #[serde(default)]
    pub headers: Headers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Default for EdgeResponse {
    fn default() -> Self {
        Self {
            status: "200".to_string(),
            status_description: None,
            headers: Headers::new(),
            body: None,
        }
    }
}

impl EdgeResponse {
    /// Sets a header, replacing any previous values under the same name.
    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        self.headers.insert(
            key.to_ascii_lowercase(),
            vec![HeaderEntry {
                key: key.to_string(),
                value: value.into(),
            }],
        );
    }

    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .get(&key.to_ascii_lowercase())
            .and_then(|entries| entries.first())
            .map(|entry| entry.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeEvent {
    pub request: EdgeRequest,
    #[serde(default)]
    pub response: EdgeResponse,
}
