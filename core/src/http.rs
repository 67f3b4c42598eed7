//! HTTP request and response descriptors.
//!
//! # Design
//! Requests and responses are plain data with owned fields. The request
//! builder produces a fully-specified `ApiRequest` (including its cache
//! directive), the transport executes it, and the resolver consumes the
//! resulting `ApiResponse`. Keeping each stage a pure value transformation
//! makes the layer deterministic and testable without a network.

use crate::cache::CacheDirective;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A fully-specified outbound request.
///
/// Built fresh per call by `request::build_request` and never mutated
/// afterwards. The cache directive is metadata for whatever platform cache
/// sits under the transport; this layer stores nothing itself.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub cache: CacheDirective,
}

/// An upstream response described as plain data.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}
