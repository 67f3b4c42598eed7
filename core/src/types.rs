//! Domain DTOs for the blog platform API.
//!
//! # Design
//! Field names match the upstream wire format exactly. Fields the upstream
//! may omit are `Option` with `#[serde(default)]`; outbound payload options
//! use `skip_serializing_if` so partial updates only send what the caller
//! set. These types are defined independently of the mock-server crate;
//! integration tests catch schema drift.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user as exposed by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    pub onboarding_completed: bool,
}

/// Abbreviated user embedded in other resources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRef {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPublic {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub owner: Option<UserRef>,
}

/// Abbreviated blog embedded in post summaries and trending entries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// The authenticated account plus its blog, if onboarding is complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeResponse {
    pub user: UserPublic,
    #[serde(default)]
    pub blog: Option<BlogPublic>,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
            PostStatus::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub post_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub status: PostStatus,
    pub like_count: u64,
    pub comment_count: u64,
    pub view_count: u64,
    #[serde(default)]
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<TagSummary>>,
    #[serde(default)]
    pub blog: Option<BlogRef>,
}

/// A full post, as returned by the detail and mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub status: PostStatus,
    pub like_count: u64,
    pub comment_count: u64,
    pub view_count: u64,
    #[serde(default)]
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub tags: Vec<TagSummary>,
    #[serde(default)]
    pub blog: Option<BlogRef>,
    pub content_md: String,
    pub content_html: String,
    #[serde(default)]
    pub author: Option<UserPublic>,
    /// Whether the requesting account liked this post. Absent for
    /// anonymous reads.
    #[serde(default)]
    pub liked: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentModel {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub post_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    pub author: UserPublic,
    #[serde(default)]
    pub children: Vec<CommentModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingUser {
    pub id: Uuid,
    pub nickname: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub blog: Option<BlogRef>,
    #[serde(default)]
    pub post_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendingCategory {
    pub category: String,
    pub posts: Vec<PostSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OtpVerifyResponse {
    pub user: UserPublic,
    pub onboarding_required: bool,
}

/// Request payload for `POST /api/v1/auth/request-otp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOtp {
    pub email: String,
}

/// Request payload for `POST /api/v1/auth/verify-otp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtp {
    pub email: String,
    pub code: String,
}

/// Request payload for `POST /api/v1/me/onboard`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteOnboarding {
    pub nickname: String,
    pub blog_name: String,
    pub blog_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub category: String,
    pub status: PostStatus,
    pub content_md: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Partial update. Only the fields present in the JSON are applied;
/// omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_md: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Request payload for `POST /api/v1/posts/{id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Signed-upload handshake fields for the third-party media endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadSignature {
    pub api_key: String,
    pub timestamp: i64,
    pub signature: String,
    pub folder: String,
    pub cloud_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_status_uses_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(PostStatus::Published).unwrap(), json!("published"));
        let status: PostStatus = serde_json::from_value(json!("draft")).unwrap();
        assert_eq!(status, PostStatus::Draft);
    }

    #[test]
    fn me_response_tolerates_missing_blog() {
        let me: MeResponse = serde_json::from_value(json!({
            "user": {
                "id": "00000000-0000-0000-0000-000000000001",
                "email": "writer@example.com",
                "onboarding_completed": false
            }
        }))
        .unwrap();
        assert!(me.blog.is_none());
        assert!(me.user.nickname.is_none());
    }

    #[test]
    fn post_summary_round_trips() {
        let value = json!({
            "id": 7,
            "title": "Hello",
            "slug": "hello",
            "category": "dev",
            "status": "published",
            "like_count": 3,
            "comment_count": 1,
            "view_count": 42,
            "published_at": "2024-01-01T00:00:00Z",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "tags": [{"id": 1, "name": "rust", "slug": "rust"}],
            "blog": {"id": 1, "name": "Acme", "slug": "acme"}
        });
        let summary: PostSummary = serde_json::from_value(value).unwrap();
        assert_eq!(summary.status, PostStatus::Published);
        assert_eq!(summary.tags.as_ref().unwrap()[0].slug, "rust");
        assert_eq!(summary.blog.as_ref().unwrap().slug, "acme");
        assert!(summary.thumbnail_url.is_none());
    }

    #[test]
    fn comments_nest_recursively() {
        let value = json!({
            "id": 1,
            "content": "parent",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "post_id": 7,
            "author": {
                "id": "00000000-0000-0000-0000-000000000001",
                "email": "writer@example.com",
                "onboarding_completed": true
            },
            "children": [{
                "id": 2,
                "content": "reply",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z",
                "post_id": 7,
                "parent_id": 1,
                "author": {
                    "id": "00000000-0000-0000-0000-000000000002",
                    "email": "reader@example.com",
                    "onboarding_completed": true
                }
            }]
        });
        let comment: CommentModel = serde_json::from_value(value).unwrap();
        assert_eq!(comment.children.len(), 1);
        assert_eq!(comment.children[0].parent_id, Some(1));
        assert!(comment.children[0].children.is_empty());
    }

    #[test]
    fn update_post_serializes_only_set_fields() {
        let update = UpdatePost {
            title: Some("New title".to_string()),
            ..UpdatePost::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"title": "New title"}));
    }

    #[test]
    fn create_comment_omits_absent_parent() {
        let comment = CreateComment {
            content: "hi".to_string(),
            parent_id: None,
        };
        assert_eq!(serde_json::to_value(&comment).unwrap(), json!({"content": "hi"}));

        let reply = CreateComment {
            content: "hi".to_string(),
            parent_id: Some(9),
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"content": "hi", "parent_id": 9})
        );
    }
}
