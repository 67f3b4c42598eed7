use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, OTP_CODE};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

/// Pull the `session=...` pair out of a login response's `set-cookie`.
fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(http::header::SET_COOKIE)
        .expect("set-cookie header")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

// --- auth ---

#[tokio::test]
async fn me_without_session_returns_401() {
    let resp = app().oneshot(get_request("/api/v1/me")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "not authenticated");
}

#[tokio::test]
async fn request_otp_returns_204_with_empty_body() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/request-otp",
            r#"{"email":"writer@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn verify_otp_with_wrong_code_returns_400() {
    use tower::Service;
    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/auth/request-otp",
            r#"{"email":"writer@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/auth/verify-otp",
            r#"{"email":"writer@example.com","code":"999999"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "invalid code");
}

#[tokio::test]
async fn verify_otp_with_missing_field_is_rejected() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/verify-otp",
            r#"{"email":"writer@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- blogs ---

#[tokio::test]
async fn unknown_blog_returns_404_detail() {
    let resp = app().oneshot(get_request("/api/v1/blogs/missing")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "not found");
}

// --- likes ---

#[tokio::test]
async fn like_toggle_requires_auth() {
    let resp = app()
        .oneshot(json_request("POST", "/api/v1/posts/1/likes/toggle", ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- full onboarding and posting flow ---

#[tokio::test]
async fn onboarding_and_posting_flow() {
    use tower::Service;
    let mut app = app().into_service();

    // request a code
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/auth/request-otp",
            r#"{"email":"writer@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // exchange it for a session
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/auth/verify-otp",
            &format!(r#"{{"email":"writer@example.com","code":"{OTP_CODE}"}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = session_cookie(&resp);
    let body = body_json(resp).await;
    assert_eq!(body["onboarding_required"], true);
    assert_eq!(body["user"]["email"], "writer@example.com");

    // me before onboarding — precondition required
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/api/v1/me")
                .header(http::header::COOKIE, &cookie)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "onboarding required");

    // onboard
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/v1/me/onboard")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::COOKIE, &cookie)
                .body(r#"{"nickname":"ink","blog_name":"Ink Press","blog_slug":"ink-press"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["user"]["onboarding_completed"], true);
    assert_eq!(body["blog"]["slug"], "ink-press");

    // me after onboarding
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/api/v1/me")
                .header(http::header::COOKIE, &cookie)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // publish a post
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/v1/blogs/ink-press/posts")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::COOKIE, &cookie)
                .body(
                    r#"{"title":"First Post","category":"dev","status":"published","content_md":"hello","tags":["rust"]}"#
                        .to_string(),
                )
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post = body_json(resp).await;
    assert_eq!(post["slug"], "first-post");
    assert_eq!(post["status"], "published");
    assert_eq!(post["content_html"], "<p>hello</p>");
    assert_eq!(post["tags"][0]["slug"], "rust");
    assert_eq!(post["liked"], false);

    // duplicate slug is rejected
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/v1/blogs/ink-press/posts")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::COOKIE, &cookie)
                .body(
                    r#"{"title":"First Post","category":"dev","status":"draft","content_md":"again"}"#
                        .to_string(),
                )
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["detail"], "post slug already exists");

    // public listing sees the published post
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/blogs/ink-press/posts?page=1&size=10&status=published"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listing = body_json(resp).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["items"][0]["slug"], "first-post");

    // anonymous detail read works for published posts and counts the view
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/blogs/ink-press/posts/first-post"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = body_json(resp).await;
    assert_eq!(detail["view_count"], 1);
    assert_eq!(detail["liked"], serde_json::Value::Null);

    // blog tag listing carries counts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/blogs/ink-press/tags"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let tags = body_json(resp).await;
    assert_eq!(tags[0]["slug"], "rust");
    assert_eq!(tags[0]["post_count"], 1);
}

#[tokio::test]
async fn drafts_are_hidden_from_other_readers() {
    use tower::Service;
    let mut app = app().into_service();

    // login + onboard + draft
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/auth/request-otp",
            r#"{"email":"writer@example.com"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/auth/verify-otp",
            &format!(r#"{{"email":"writer@example.com","code":"{OTP_CODE}"}}"#),
        ))
        .await
        .unwrap();
    let cookie = session_cookie(&resp);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/v1/me/onboard")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::COOKIE, &cookie)
                .body(r#"{"nickname":"ink","blog_name":"Ink Press","blog_slug":"ink-press"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("POST")
                .uri("/api/v1/blogs/ink-press/posts")
                .header(http::header::CONTENT_TYPE, "application/json")
                .header(http::header::COOKIE, &cookie)
                .body(r#"{"title":"Notes","category":"dev","status":"draft","content_md":"wip"}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // the author still sees it
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .uri("/api/v1/blogs/ink-press/posts/notes")
                .header(http::header::COOKIE, &cookie)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // anonymous readers get a 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_request("/api/v1/blogs/ink-press/posts/notes"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
