//! Error types for the blog API client.
//!
//! # Design
//! Every non-2xx upstream response lands in `Http`, which carries the raw
//! status, the source URL, and whatever diagnostic payload could be captured.
//! The message comes from the payload's `detail` field when that field is a
//! plain string; anything else falls back to a generic status-coded message
//! while the payload stays available for callers that understand a richer
//! shape. There is no per-status variant here — interpreting 401/404/428 is
//! entirely the caller's business.

use std::fmt;

use serde_json::Value;

/// Errors returned by the access layer.
#[derive(Debug)]
pub enum ApiError {
    /// The upstream returned a status outside the 2xx range.
    Http {
        status: u16,
        message: String,
        payload: Option<Value>,
        url: String,
    },

    /// The request never produced an HTTP response (connect failure, broken
    /// stream, invalid URL).
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    Serialization(String),
}

impl ApiError {
    /// Build the error for a non-2xx response from its captured payload.
    pub(crate) fn http(status: u16, url: &str, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(|value| value.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("API request failed with status {status}"));
        ApiError::Http {
            status,
            message,
            payload,
            url: url.to_string(),
        }
    }

    /// The upstream HTTP status, if this error came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Http { status, message, url, .. } => {
                write!(f, "HTTP {status} from {url}: {message}")
            }
            ApiError::Transport(msg) => write!(f, "transport failure: {msg}"),
            ApiError::Deserialization(msg) => write!(f, "deserialization failed: {msg}"),
            ApiError::Serialization(msg) => write!(f, "serialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}
