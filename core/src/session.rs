//! Session interpretation on top of the raw `/me` endpoint.
//!
//! The access layer raises every non-2xx response; these helpers apply the
//! status policy pages share: 401/403 mean "not signed in", 428 means the
//! account exists but has not finished onboarding. Navigation (login or
//! onboarding redirects) is the embedding application's job — it gets an
//! enum, not a side effect.

use crate::client::BlogApi;
use crate::error::ApiError;
use crate::request::AuthContext;
use crate::types::MeResponse;

/// What the current credentials amount to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// No valid session.
    Anonymous,
    /// Signed in, but onboarding is incomplete: no blog yet.
    NeedsOnboarding,
    /// Fully onboarded account.
    Active(MeResponse),
}

/// Fetch the current account, treating 401/403/428 as "nobody" instead of
/// an error. Anything else propagates.
pub fn current_user(api: &BlogApi, auth: &AuthContext) -> Result<Option<MeResponse>, ApiError> {
    optional_me(api.me(auth))
}

/// Classify the current credentials.
pub fn session_state(api: &BlogApi, auth: &AuthContext) -> Result<SessionState, ApiError> {
    classify(api.me(auth))
}

/// Sign out. A 401 means the session was already gone, which is the
/// outcome the caller wanted.
pub fn logout(api: &BlogApi, auth: &AuthContext) -> Result<(), ApiError> {
    match api.logout(auth) {
        Err(err) if err.status() == Some(401) => Ok(()),
        other => other,
    }
}

fn optional_me(result: Result<MeResponse, ApiError>) -> Result<Option<MeResponse>, ApiError> {
    match result {
        Ok(me) => Ok(Some(me)),
        Err(err) if matches!(err.status(), Some(401 | 403 | 428)) => Ok(None),
        Err(err) => Err(err),
    }
}

fn classify(result: Result<MeResponse, ApiError>) -> Result<SessionState, ApiError> {
    match result {
        Ok(me) if me.blog.is_none() => Ok(SessionState::NeedsOnboarding),
        Ok(me) => Ok(SessionState::Active(me)),
        Err(err) if err.status() == Some(428) => Ok(SessionState::NeedsOnboarding),
        Err(err) if matches!(err.status(), Some(401 | 403)) => Ok(SessionState::Anonymous),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BlogPublic, UserPublic};
    use serde_json::json;
    use uuid::Uuid;

    fn me(with_blog: bool) -> MeResponse {
        MeResponse {
            user: UserPublic {
                id: Uuid::nil(),
                email: "writer@example.com".to_string(),
                nickname: Some("ink".to_string()),
                profile_image_url: None,
                onboarding_completed: with_blog,
            },
            blog: with_blog.then(|| BlogPublic {
                id: 1,
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                description: None,
                cover_image_url: None,
                owner: None,
            }),
        }
    }

    fn http_error(status: u16) -> ApiError {
        ApiError::http(status, "http://localhost:8000/api/v1/me", Some(json!({"detail": "x"})))
    }

    #[test]
    fn soft_statuses_map_to_nobody() {
        for status in [401, 403, 428] {
            assert!(optional_me(Err(http_error(status))).unwrap().is_none());
        }
    }

    #[test]
    fn other_errors_propagate() {
        let err = optional_me(Err(http_error(500))).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn classify_active_account() {
        assert!(matches!(classify(Ok(me(true))).unwrap(), SessionState::Active(_)));
    }

    #[test]
    fn classify_missing_blog_as_needs_onboarding() {
        assert_eq!(classify(Ok(me(false))).unwrap(), SessionState::NeedsOnboarding);
    }

    #[test]
    fn classify_precondition_required_as_needs_onboarding() {
        assert_eq!(classify(Err(http_error(428))).unwrap(), SessionState::NeedsOnboarding);
    }

    #[test]
    fn classify_unauthorized_as_anonymous() {
        assert_eq!(classify(Err(http_error(401))).unwrap(), SessionState::Anonymous);
        assert_eq!(classify(Err(http_error(403))).unwrap(), SessionState::Anonymous);
    }

    #[test]
    fn classify_keeps_hard_failures() {
        assert!(classify(Err(http_error(500))).is_err());
    }
}
