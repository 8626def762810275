use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Media type assumed when a successful response does not declare a usable one.
pub const DEFAULT_MEDIA_TYPE: &str = "video/mp4";
pub const GENERIC_FAILURE_MESSAGE: &str = "Download failed. Please try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid server response";
pub const NO_RESPONSE_MESSAGE: &str = "No response from server. Please check your connection.";

/// A received HTTP response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    /// Header names are stored lowercase.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// Media bytes ready to be saved.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl fmt::Debug for MediaPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPayload")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Terminal result of one attempt; exactly one is produced per attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    BinaryPayload(MediaPayload),
    StructuredError(String),
    TransportFailure(String),
}

impl ResponseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseOutcome::BinaryPayload(_))
    }
}

/// Decide whether a response carries media or an error description.
///
/// The status range is checked first: a 2xx body is media even when it claims to be JSON.
pub fn classify(response: RawResponse) -> ResponseOutcome {
    if (200..300).contains(&response.status) {
        let content_type = media_type_or_default(response.content_type());
        return ResponseOutcome::BinaryPayload(MediaPayload {
            bytes: response.body,
            content_type,
        });
    }

    if response.content_type().is_some_and(is_json_content_type) {
        return ResponseOutcome::StructuredError(structured_message(&response.body));
    }

    ResponseOutcome::TransportFailure(format!(
        "Download failed: server responded with status {}",
        response.status
    ))
}

fn structured_message(body: &[u8]) -> String {
    let Ok(text) = std::str::from_utf8(body) else {
        return INVALID_RESPONSE_MESSAGE.to_string();
    };
    match serde_json::from_str::<Value>(text) {
        Ok(document) => {
            extract_message(&document).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
        }
        Err(_) => INVALID_RESPONSE_MESSAGE.to_string(),
    }
}

fn extract_message(document: &Value) -> Option<String> {
    match document.get("detail") {
        Some(Value::String(detail)) if !detail.trim().is_empty() => {
            return Some(detail.clone());
        }
        // Validation failures arrive as `[{"loc": [...], "msg": "..."}]`.
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return Some(joined);
            }
        }
        _ => {}
    }
    document
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.trim().is_empty())
        .map(ToOwned::to_owned)
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
        .to_ascii_lowercase()
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = essence(content_type);
    essence == "application/json" || essence.ends_with("+json")
}

fn media_type_or_default(content_type: Option<&str>) -> String {
    content_type
        .map(essence)
        .filter(|ct| ct.starts_with("video/") || ct.starts_with("audio/"))
        .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string())
}
