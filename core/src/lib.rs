//! Typed access layer for the blog platform's REST API.
//!
//! # Overview
//! Builds outgoing requests against a configurable base URL, forwards the
//! session cookie from an explicit [`AuthContext`], selects a per-call cache
//! directive, parses responses by content type, and surfaces every non-2xx
//! response as a structured [`ApiError`]. On top of that sits the typed
//! operation surface of the platform: OTP auth, profile/onboarding, blogs,
//! posts, comments, likes, tags, trending feeds, and the signed-upload
//! handshake.
//!
//! # Design
//! - `BlogApi` is stateless per call — it holds a base URL and an agent.
//! - Each call is build → execute → resolve; every stage works on plain
//!   data, so everything up to the socket is testable without a network.
//! - The outcome is always an explicit `Result`: a resolved payload or a
//!   structured error, never a third state.
//! - Callers interpret status codes; this layer never special-cases them.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod session;
pub mod transport;
pub mod types;

pub use cache::CacheDirective;
pub use client::{AvailabilityKind, BlogApi, PostListQuery};
pub use error::ApiError;
pub use http::{ApiRequest, ApiResponse, HttpMethod};
pub use request::{build_request, build_url, AuthContext, FetchOptions};
pub use response::{resolve, Payload};
pub use session::{current_user, logout, session_state, SessionState};
pub use types::{
    AvailabilityResponse, BlogPublic, BlogRef, CommentModel, CompleteOnboarding, CreateComment,
    CreatePost, LikeToggleResponse, MeResponse, OtpVerifyResponse, Paginated, PostDetail,
    PostStatus, PostSummary, RequestOtp, TagSummary, TrendingCategory, TrendingUser, UpdatePost,
    UploadSignature, UserPublic, UserRef, VerifyOtp,
};
