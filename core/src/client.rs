//! Typed client for the blog platform API.
//!
//! # Design
//! `BlogApi` holds a base URL and a reusable agent, and carries no per-call
//! state. The core `fetch` primitive is build → execute → resolve; the verb
//! helpers fix the method and serialize JSON bodies, nothing more. Domain
//! operations sit on top and encode the cache policy each endpoint wants:
//! trending feeds revalidate every 60s, blog metadata and tag listings every
//! 300s, everything touching auth state or ownership is fetched fresh.

use serde::Serialize;

use crate::config;
use crate::error::ApiError;
use crate::http::{ApiResponse, HttpMethod};
use crate::request::{build_request, AuthContext, FetchOptions};
use crate::response::{resolve, Payload};
use crate::transport;
use crate::types::{
    AvailabilityResponse, BlogPublic, CommentModel, CompleteOnboarding, CreateComment, CreatePost,
    LikeToggleResponse, MeResponse, OtpVerifyResponse, Paginated, PostDetail, PostStatus,
    PostSummary, RequestOtp, TagSummary, TrendingCategory, TrendingUser, UpdatePost, UploadSignature,
    VerifyOtp,
};

/// Client for the blog platform API.
pub struct BlogApi {
    base_url: String,
    agent: ureq::Agent,
}

impl BlogApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: transport::default_agent(),
        }
    }

    /// Client bound to the environment-configured base URL.
    pub fn from_env() -> Self {
        Self::new(&config::api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build and execute a request, returning the raw response.
    ///
    /// Most callers want [`BlogApi::fetch`]; this variant exists for the few
    /// that need response headers, e.g. capturing the session cookie issued
    /// on login.
    pub fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        auth: &AuthContext,
        options: &FetchOptions,
    ) -> Result<ApiResponse, ApiError> {
        let request = build_request(&self.base_url, method, path, body, auth, options);
        transport::execute(&self.agent, &request)
    }

    /// The core call primitive: one request, one resolved payload or one
    /// structured error.
    pub fn fetch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        auth: &AuthContext,
        options: &FetchOptions,
    ) -> Result<Payload, ApiError> {
        resolve(self.dispatch(method, path, body, auth, options)?)
    }

    // ------------------------------------------------------------------
    // Verb helpers
    // ------------------------------------------------------------------

    pub fn get(
        &self,
        path: &str,
        auth: &AuthContext,
        options: &FetchOptions,
    ) -> Result<Payload, ApiError> {
        self.fetch(HttpMethod::Get, path, None, auth, options)
    }

    pub fn post<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        auth: &AuthContext,
        options: &FetchOptions,
    ) -> Result<Payload, ApiError> {
        self.fetch(HttpMethod::Post, path, json_body(body)?, auth, options)
    }

    pub fn patch<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        auth: &AuthContext,
        options: &FetchOptions,
    ) -> Result<Payload, ApiError> {
        self.fetch(HttpMethod::Patch, path, json_body(body)?, auth, options)
    }

    pub fn delete(
        &self,
        path: &str,
        auth: &AuthContext,
        options: &FetchOptions,
    ) -> Result<Payload, ApiError> {
        self.fetch(HttpMethod::Delete, path, None, auth, options)
    }

    // ------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------

    /// Ask the upstream to email a one-time code. Resolves to nothing on
    /// the expected 204.
    pub fn request_otp(&self, auth: &AuthContext, payload: &RequestOtp) -> Result<(), ApiError> {
        self.post("/api/v1/auth/request-otp", Some(payload), auth, &FetchOptions::default())?;
        Ok(())
    }

    /// Exchange a one-time code for a session.
    ///
    /// Returns the verification body plus an [`AuthContext`] holding the
    /// cookies the upstream set, ready to be passed to authenticated calls.
    pub fn verify_otp(
        &self,
        auth: &AuthContext,
        payload: &VerifyOtp,
    ) -> Result<(OtpVerifyResponse, AuthContext), ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let response = self.dispatch(
            HttpMethod::Post,
            "/api/v1/auth/verify-otp",
            Some(body),
            auth,
            &FetchOptions::default(),
        )?;

        let mut session = auth.clone();
        for (name, value) in &response.headers {
            if name.eq_ignore_ascii_case("set-cookie") {
                session.apply_set_cookie(value);
            }
        }

        let verified = resolve(response)?.json()?;
        Ok((verified, session))
    }

    pub fn logout(&self, auth: &AuthContext) -> Result<(), ApiError> {
        self.post::<()>("/api/v1/auth/logout", None, auth, &FetchOptions::default())?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Account
    // ------------------------------------------------------------------

    pub fn me(&self, auth: &AuthContext) -> Result<MeResponse, ApiError> {
        self.get("/api/v1/me", auth, &FetchOptions::default())?.json()
    }

    pub fn onboard(
        &self,
        auth: &AuthContext,
        payload: &CompleteOnboarding,
    ) -> Result<MeResponse, ApiError> {
        self.post("/api/v1/me/onboard", Some(payload), auth, &FetchOptions::default())?
            .json()
    }

    pub fn availability(
        &self,
        auth: &AuthContext,
        kind: AvailabilityKind,
        value: &str,
    ) -> Result<AvailabilityResponse, ApiError> {
        let path = format!(
            "/api/v1/me/availability/{}?value={}",
            kind.as_str(),
            encode_query_value(value)
        );
        self.get(&path, auth, &FetchOptions::default())?.json()
    }

    // ------------------------------------------------------------------
    // Blogs and posts
    // ------------------------------------------------------------------

    pub fn blog(&self, auth: &AuthContext, slug: &str) -> Result<BlogPublic, ApiError> {
        self.get(&format!("/api/v1/blogs/{slug}"), auth, &FetchOptions::revalidate(300))?
            .json()
    }

    pub fn blog_posts(
        &self,
        auth: &AuthContext,
        slug: &str,
        query: &PostListQuery,
    ) -> Result<Paginated<PostSummary>, ApiError> {
        let path = format!("/api/v1/blogs/{slug}/posts?{}", query.query_string());
        self.get(&path, auth, &FetchOptions::default())?.json()
    }

    pub fn blog_tags(&self, auth: &AuthContext, slug: &str) -> Result<Vec<TagSummary>, ApiError> {
        self.get(&format!("/api/v1/blogs/{slug}/tags"), auth, &FetchOptions::revalidate(300))?
            .json()
    }

    pub fn post_detail(
        &self,
        auth: &AuthContext,
        blog_slug: &str,
        post_slug: &str,
    ) -> Result<PostDetail, ApiError> {
        self.get(
            &format!("/api/v1/blogs/{blog_slug}/posts/{post_slug}"),
            auth,
            &FetchOptions::default(),
        )?
        .json()
    }

    pub fn create_post(
        &self,
        auth: &AuthContext,
        blog_slug: &str,
        payload: &CreatePost,
    ) -> Result<PostDetail, ApiError> {
        self.post(
            &format!("/api/v1/blogs/{blog_slug}/posts"),
            Some(payload),
            auth,
            &FetchOptions::default(),
        )?
        .json()
    }

    pub fn update_post(
        &self,
        auth: &AuthContext,
        blog_slug: &str,
        post_slug: &str,
        payload: &UpdatePost,
    ) -> Result<PostDetail, ApiError> {
        self.patch(
            &format!("/api/v1/blogs/{blog_slug}/posts/{post_slug}"),
            Some(payload),
            auth,
            &FetchOptions::default(),
        )?
        .json()
    }

    pub fn delete_post(
        &self,
        auth: &AuthContext,
        blog_slug: &str,
        post_slug: &str,
    ) -> Result<(), ApiError> {
        self.delete(
            &format!("/api/v1/blogs/{blog_slug}/posts/{post_slug}"),
            auth,
            &FetchOptions::default(),
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Comments and likes
    // ------------------------------------------------------------------

    pub fn comments(&self, auth: &AuthContext, post_id: i64) -> Result<Vec<CommentModel>, ApiError> {
        self.get(&format!("/api/v1/posts/{post_id}/comments"), auth, &FetchOptions::default())?
            .json()
    }

    pub fn create_comment(
        &self,
        auth: &AuthContext,
        post_id: i64,
        payload: &CreateComment,
    ) -> Result<CommentModel, ApiError> {
        self.post(
            &format!("/api/v1/posts/{post_id}/comments"),
            Some(payload),
            auth,
            &FetchOptions::default(),
        )?
        .json()
    }

    pub fn toggle_like(
        &self,
        auth: &AuthContext,
        post_id: i64,
    ) -> Result<LikeToggleResponse, ApiError> {
        self.post::<()>(
            &format!("/api/v1/posts/{post_id}/likes/toggle"),
            None,
            auth,
            &FetchOptions::default(),
        )?
        .json()
    }

    // ------------------------------------------------------------------
    // Trending
    // ------------------------------------------------------------------

    pub fn trending_posts(&self, auth: &AuthContext) -> Result<Vec<PostSummary>, ApiError> {
        self.get("/api/v1/trending/posts", auth, &FetchOptions::revalidate(60))?.json()
    }

    pub fn trending_users(&self, auth: &AuthContext) -> Result<Vec<TrendingUser>, ApiError> {
        self.get("/api/v1/trending/users", auth, &FetchOptions::revalidate(60))?.json()
    }

    pub fn trending_by_category(
        &self,
        auth: &AuthContext,
    ) -> Result<Vec<TrendingCategory>, ApiError> {
        self.get("/api/v1/trending/by-category", auth, &FetchOptions::revalidate(60))?
            .json()
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Fetch the signed-upload handshake fields. The multipart upload
    /// itself goes straight from the browser to the media CDN and never
    /// passes through this layer.
    pub fn upload_signature(&self, auth: &AuthContext) -> Result<UploadSignature, ApiError> {
        self.post::<()>("/api/v1/uploads/signature", None, auth, &FetchOptions::default())?
            .json()
    }
}

fn json_body<B: Serialize>(body: Option<&B>) -> Result<Option<String>, ApiError> {
    body.map(serde_json::to_string)
        .transpose()
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Which uniqueness check to run during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityKind {
    Nickname,
    BlogSlug,
}

impl AvailabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityKind::Nickname => "nickname",
            AvailabilityKind::BlogSlug => "blog-slug",
        }
    }
}

/// Filters for a blog's post listing.
#[derive(Debug, Clone)]
pub struct PostListQuery {
    pub page: u32,
    pub size: u32,
    pub status: Option<PostStatus>,
    pub tag: Option<String>,
    pub category: Option<String>,
}

impl Default for PostListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            status: None,
            tag: None,
            category: None,
        }
    }
}

impl PostListQuery {
    /// Listing used by public blog pages: published posts only.
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    fn query_string(&self) -> String {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(tag) = &self.tag {
            pairs.push(("tag", tag.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", encode_query_value(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Percent-encode a query value; spaces become `+`.
fn encode_query_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(c),
            ' ' => result.push('+'),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    result
}
