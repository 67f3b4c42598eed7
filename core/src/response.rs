//! Response resolution: one success shape, one error shape, nothing else.
//!
//! # Design
//! Every executed call ends in exactly one of two places: a [`Payload`] or an
//! [`ApiError`]. A 204 resolves to `Payload::Empty` regardless of what the
//! caller expected; a JSON content type is decoded; anything else comes back
//! as raw text for the caller to interpret. Non-2xx responses always produce
//! an error — the same decoding runs first to capture a diagnostic payload,
//! and a payload that fails to decode is simply dropped rather than masking
//! the original failure.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::ApiResponse;

/// The resolved body of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 204 No Content. Distinct from JSON `null` and from an empty string.
    Empty,
    Json(Value),
    Text(String),
}

impl Payload {
    /// Decode a JSON payload into `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Payload::Json(value) => {
                serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
            }
            Payload::Empty => Err(ApiError::Deserialization(
                "expected a JSON body, got an empty response".to_string(),
            )),
            Payload::Text(_) => Err(ApiError::Deserialization(
                "expected a JSON body, got plain text".to_string(),
            )),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }
}

/// Turn a raw response into a payload or a structured error.
pub fn resolve(response: ApiResponse) -> Result<Payload, ApiError> {
    if (200..300).contains(&response.status) {
        return decode(&response).map_err(|e| ApiError::Deserialization(e.to_string()));
    }

    tracing::warn!(status = response.status, url = %response.url, "API request failed");

    let payload = match decode(&response) {
        Ok(Payload::Json(value)) => Some(value),
        Ok(Payload::Text(text)) => Some(Value::String(text)),
        Ok(Payload::Empty) => None,
        // A diagnostic body that cannot be decoded never masks the failure.
        Err(_) => None,
    };
    Err(ApiError::http(response.status, &response.url, payload))
}

fn decode(response: &ApiResponse) -> Result<Payload, serde_json::Error> {
    if response.status == 204 {
        return Ok(Payload::Empty);
    }
    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        Ok(Payload::Json(serde_json::from_str(&response.body)?))
    } else {
        Ok(Payload::Text(response.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> ApiResponse {
        let mut headers = Vec::new();
        if let Some(ct) = content_type {
            headers.push(("content-type".to_string(), ct.to_string()));
        }
        ApiResponse {
            status,
            url: "http://localhost:8000/api/v1/test".to_string(),
            headers,
            body: body.to_string(),
        }
    }

    #[test]
    fn no_content_resolves_to_empty() {
        let payload = resolve(response(204, None, "")).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn json_content_type_is_decoded() {
        let payload = resolve(response(
            200,
            Some("application/json; charset=utf-8"),
            r#"{"id":1,"name":"Acme","slug":"acme"}"#,
        ))
        .unwrap();
        assert_eq!(
            payload,
            Payload::Json(json!({"id": 1, "name": "Acme", "slug": "acme"}))
        );
    }

    #[test]
    fn other_content_types_come_back_as_text() {
        let payload = resolve(response(200, Some("text/plain"), "pong")).unwrap();
        assert_eq!(payload, Payload::Text("pong".to_string()));
    }

    #[test]
    fn missing_content_type_is_treated_as_text() {
        let payload = resolve(response(200, None, "raw")).unwrap();
        assert_eq!(payload, Payload::Text("raw".to_string()));
    }

    #[test]
    fn malformed_json_on_success_is_a_deserialization_error() {
        let err = resolve(response(200, Some("application/json"), "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn error_status_uses_detail_message() {
        let err = resolve(response(
            404,
            Some("application/json"),
            r#"{"detail":"not found"}"#,
        ))
        .unwrap_err();
        match err {
            ApiError::Http { status, message, .. } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn error_with_undecodable_body_still_raises() {
        let err = resolve(response(502, Some("application/json"), "<html>bad gateway</html>"))
            .unwrap_err();
        match err {
            ApiError::Http { status, message, payload, .. } => {
                assert_eq!(status, 502);
                assert_eq!(message, "API request failed with status 502");
                assert!(payload.is_none());
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn error_with_text_body_preserves_it_as_payload() {
        let err = resolve(response(503, Some("text/plain"), "maintenance")).unwrap_err();
        match err {
            ApiError::Http { message, payload, .. } => {
                assert_eq!(message, "API request failed with status 503");
                assert_eq!(payload, Some(Value::String("maintenance".to_string())));
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn typed_accessor_decodes_json() {
        #[derive(serde::Deserialize)]
        struct Blog {
            id: i64,
            slug: String,
        }
        let payload = Payload::Json(json!({"id": 1, "slug": "acme"}));
        let blog: Blog = payload.json().unwrap();
        assert_eq!(blog.id, 1);
        assert_eq!(blog.slug, "acme");
    }

    #[test]
    fn typed_accessor_rejects_empty_and_text() {
        let err = Payload::Empty.json::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        let err = Payload::Text("x".to_string()).json::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
