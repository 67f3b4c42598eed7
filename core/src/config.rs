//! Base URL resolution from the environment.

use std::env;

/// Development fallback used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Resolve the upstream API base URL.
///
/// Reads `NEXT_PUBLIC_API_BASE_URL`, then `NEXT_PUBLIC_LOCAL_API_BASE_URL`,
/// then falls back to [`DEFAULT_BASE_URL`]. The variable names are the ones
/// the deployed frontend already uses, so a single environment configures
/// both implementations. Any trailing slash is trimmed so URL joining always
/// inserts exactly one separator.
pub fn api_base_url() -> String {
    let base = env::var("NEXT_PUBLIC_API_BASE_URL")
        .or_else(|_| env::var("NEXT_PUBLIC_LOCAL_API_BASE_URL"))
        .unwrap_or_else(|_| {
            tracing::debug!("no API base URL configured, using {DEFAULT_BASE_URL}");
            DEFAULT_BASE_URL.to_string()
        });
    base.trim_end_matches('/').to_string()
}
