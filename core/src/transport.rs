//! Blocking HTTP executor for built requests.
//!
//! # Design
//! One outbound request per call, run to completion: no retries, no extra
//! timeout beyond the platform default, no cancellation. ureq's automatic
//! status-code-as-error behavior is disabled so 4xx/5xx responses come back
//! as data and status interpretation stays in the resolver. Transport-level
//! failures (connect errors, broken streams) surface as
//! `ApiError::Transport` without further interpretation.

use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse, HttpMethod};

/// Agent used for all requests issued by one client.
pub fn default_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

/// Execute an `ApiRequest` and return the raw `ApiResponse`.
pub fn execute(agent: &ureq::Agent, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
    tracing::debug!(method = request.method.as_str(), url = %request.url, "dispatching API request");

    let result = match (request.method, request.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(&request.url), &request.headers).call(),
        (HttpMethod::Delete, _) => {
            with_headers(agent.delete(&request.url), &request.headers).call()
        }
        (HttpMethod::Post, Some(body)) => {
            with_headers(agent.post(&request.url), &request.headers).send(body.as_bytes())
        }
        (HttpMethod::Post, None) => {
            with_headers(agent.post(&request.url), &request.headers).send_empty()
        }
        (HttpMethod::Patch, Some(body)) => {
            with_headers(agent.patch(&request.url), &request.headers).send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => {
            with_headers(agent.patch(&request.url), &request.headers).send_empty()
        }
    };

    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or("").to_string(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(ApiResponse {
        status,
        url: request.url.clone(),
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name, value);
    }
    builder
}
