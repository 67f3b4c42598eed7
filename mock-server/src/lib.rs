//! In-memory implementation of the blog platform API for tests and local
//! development.
//!
//! Covers the surface the client consumes: OTP auth with an opaque `session`
//! cookie, me/onboarding, availability checks, blog and post CRUD with slug
//! addressing, nested comments, like toggling, trending feeds, and the
//! signed-upload handshake. Error bodies are `{"detail": "..."}` to match
//! the upstream contract. The clock is fixed; tests never compare
//! timestamps.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The one-time code every login uses. There is no outbound email here;
/// callers just know the code.
pub const OTP_CODE: &str = "123456";

const MOCK_TIME: &str = "2024-01-01T00:00:00Z";

#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
    pub onboarded: bool,
}

#[derive(Clone, Debug)]
pub struct Blog {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub owner: Uuid,
}

#[derive(Clone, Debug)]
pub struct Post {
    pub id: i64,
    pub blog_id: i64,
    pub author: Uuid,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub status: String,
    pub content_md: String,
    pub content_html: String,
    pub excerpt: Option<String>,
    pub thumbnail_url: Option<String>,
    pub tags: Vec<String>,
    pub likes: HashSet<Uuid>,
    pub view_count: u64,
    pub created_at: String,
    pub updated_at: String,
    pub published_at: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub author: Uuid,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Default)]
pub struct AppState {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Uuid>,
    pending_otps: HashMap<String, String>,
    blogs: Vec<Blog>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    tags: Vec<String>,
    next_id: i64,
}

impl AppState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn blog_by_slug(&self, slug: &str) -> Option<&Blog> {
        self.blogs.iter().find(|b| b.slug == slug)
    }

    fn blog_of(&self, user_id: Uuid) -> Option<&Blog> {
        self.blogs.iter().find(|b| b.owner == user_id)
    }

    fn register_tags(&mut self, slugs: &[String]) {
        for slug in slugs {
            if !self.tags.contains(slug) {
                self.tags.push(slug.clone());
            }
        }
    }

    fn tag_id(&self, slug: &str) -> i64 {
        self.tags
            .iter()
            .position(|t| t == slug)
            .map(|i| i as i64 + 1)
            .unwrap_or(0)
    }
}

pub type Db = Arc<RwLock<AppState>>;

type ApiErr = (StatusCode, Json<Value>);

fn detail(status: StatusCode, message: &str) -> ApiErr {
    (status, Json(json!({ "detail": message })))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(AppState::default()));
    Router::new()
        .route("/api/v1/auth/request-otp", post(request_otp))
        .route("/api/v1/auth/verify-otp", post(verify_otp))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/me", get(me))
        .route("/api/v1/me/onboard", post(onboard))
        .route("/api/v1/me/availability/{kind}", get(availability))
        .route("/api/v1/blogs/{slug}", get(get_blog))
        .route("/api/v1/blogs/{slug}/posts", get(list_posts).post(create_post))
        .route("/api/v1/blogs/{slug}/tags", get(list_tags))
        .route(
            "/api/v1/blogs/{slug}/posts/{post_slug}",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/api/v1/posts/{id}/comments", get(list_comments).post(create_comment))
        .route("/api/v1/posts/{id}/likes/toggle", post(toggle_like))
        .route("/api/v1/trending/posts", get(trending_posts))
        .route("/api/v1/trending/users", get(trending_users))
        .route("/api/v1/trending/by-category", get(trending_by_category))
        .route("/api/v1/uploads/signature", post(upload_signature))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Session handling
// ---------------------------------------------------------------------------

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookie = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == "session").then(|| value.to_string())
    })
}

fn viewer(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let token = session_token(headers)?;
    state.sessions.get(&token).copied()
}

fn auth_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiErr> {
    viewer(state, headers)
        .and_then(|id| state.users.get(&id).cloned())
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "not authenticated"))
}

// ---------------------------------------------------------------------------
// Body builders
// ---------------------------------------------------------------------------

fn user_body(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "nickname": user.nickname,
        "profile_image_url": user.profile_image_url,
        "onboarding_completed": user.onboarded,
    })
}

fn blog_ref(blog: &Blog) -> Value {
    json!({ "id": blog.id, "name": blog.name, "slug": blog.slug })
}

fn blog_body(state: &AppState, blog: &Blog) -> Value {
    let owner = state.users.get(&blog.owner).map(|u| {
        json!({
            "id": u.id,
            "email": u.email,
            "nickname": u.nickname,
            "profile_image_url": u.profile_image_url,
        })
    });
    json!({
        "id": blog.id,
        "name": blog.name,
        "slug": blog.slug,
        "description": blog.description,
        "cover_image_url": blog.cover_image_url,
        "owner": owner,
    })
}

fn me_body(state: &AppState, user: &User) -> Value {
    json!({
        "user": user_body(user),
        "blog": state.blog_of(user.id).map(|b| blog_body(state, b)),
    })
}

fn tag_body(state: &AppState, slug: &str, post_count: Option<u64>) -> Value {
    json!({ "id": state.tag_id(slug), "name": slug, "slug": slug, "post_count": post_count })
}

fn comment_count(state: &AppState, post_id: i64) -> usize {
    state.comments.iter().filter(|c| c.post_id == post_id).count()
}

fn post_summary_body(state: &AppState, post: &Post) -> Value {
    json!({
        "id": post.id,
        "title": post.title,
        "slug": post.slug,
        "category": post.category,
        "status": post.status,
        "like_count": post.likes.len(),
        "comment_count": comment_count(state, post.id),
        "view_count": post.view_count,
        "published_at": post.published_at,
        "created_at": post.created_at,
        "updated_at": post.updated_at,
        "thumbnail_url": post.thumbnail_url,
        "excerpt": post.excerpt,
        "tags": post.tags.iter().map(|t| tag_body(state, t, None)).collect::<Vec<_>>(),
        "blog": state.blogs.iter().find(|b| b.id == post.blog_id).map(blog_ref),
    })
}

fn post_detail_body(state: &AppState, post: &Post, viewer_id: Option<Uuid>) -> Value {
    let mut body = post_summary_body(state, post);
    body["content_md"] = json!(post.content_md);
    body["content_html"] = json!(post.content_html);
    body["author"] = state.users.get(&post.author).map(user_body).unwrap_or(Value::Null);
    body["liked"] = json!(viewer_id.map(|id| post.likes.contains(&id)));
    body
}

fn comment_body(state: &AppState, comment: &Comment) -> Value {
    let children: Vec<Value> = state
        .comments
        .iter()
        .filter(|c| c.parent_id == Some(comment.id))
        .map(|c| comment_body(state, c))
        .collect();
    json!({
        "id": comment.id,
        "content": comment.content,
        "created_at": comment.created_at,
        "updated_at": comment.updated_at,
        "post_id": comment.post_id,
        "parent_id": comment.parent_id,
        "author": state.users.get(&comment.author).map(user_body).unwrap_or(Value::Null),
        "children": children,
    })
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RequestOtpBody {
    email: String,
}

async fn request_otp(
    State(db): State<Db>,
    Json(body): Json<RequestOtpBody>,
) -> Result<StatusCode, ApiErr> {
    if body.email.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "email required"));
    }
    let mut state = db.write().await;
    state.pending_otps.insert(body.email, OTP_CODE.to_string());
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct VerifyOtpBody {
    email: String,
    code: String,
}

async fn verify_otp(
    State(db): State<Db>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<impl IntoResponse, ApiErr> {
    let mut state = db.write().await;
    let expected = state.pending_otps.get(&body.email).cloned();
    if expected.as_deref() != Some(body.code.as_str()) {
        return Err(detail(StatusCode::BAD_REQUEST, "invalid code"));
    }
    state.pending_otps.remove(&body.email);

    let user = match state.users.values().find(|u| u.email == body.email).cloned() {
        Some(user) => user,
        None => {
            let user = User {
                id: Uuid::new_v4(),
                email: body.email.clone(),
                nickname: None,
                profile_image_url: None,
                onboarded: false,
            };
            state.users.insert(user.id, user.clone());
            user
        }
    };

    let token = Uuid::new_v4().to_string();
    state.sessions.insert(token.clone(), user.id);

    Ok((
        [(header::SET_COOKIE, format!("session={token}; Path=/; HttpOnly"))],
        Json(json!({ "user": user_body(&user), "onboarding_required": !user.onboarded })),
    ))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<StatusCode, ApiErr> {
    let mut state = db.write().await;
    let token = session_token(&headers)
        .filter(|t| state.sessions.contains_key(t))
        .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "not authenticated"))?;
    state.sessions.remove(&token);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Me / onboarding
// ---------------------------------------------------------------------------

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    let user = auth_user(&state, &headers)?;
    if !user.onboarded {
        return Err(detail(StatusCode::PRECONDITION_REQUIRED, "onboarding required"));
    }
    Ok(Json(me_body(&state, &user)))
}

#[derive(Deserialize)]
struct OnboardBody {
    nickname: String,
    blog_name: String,
    blog_slug: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    profile_image_url: Option<String>,
}

async fn onboard(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(body): Json<OnboardBody>,
) -> Result<Json<Value>, ApiErr> {
    let mut state = db.write().await;
    let user = auth_user(&state, &headers)?;
    if user.onboarded {
        return Err(detail(StatusCode::CONFLICT, "already onboarded"));
    }
    if body.nickname.trim().is_empty() || body.blog_name.trim().is_empty() || body.blog_slug.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "nickname, blog_name and blog_slug are required"));
    }
    if state.users.values().any(|u| u.id != user.id && u.nickname.as_deref() == Some(body.nickname.as_str())) {
        return Err(detail(StatusCode::CONFLICT, "nickname already in use"));
    }
    if state.blog_by_slug(&body.blog_slug).is_some() {
        return Err(detail(StatusCode::CONFLICT, "blog slug already in use"));
    }

    let blog = Blog {
        id: state.next_id(),
        name: body.blog_name,
        slug: body.blog_slug,
        description: body.description,
        cover_image_url: None,
        owner: user.id,
    };
    state.blogs.push(blog);

    let updated = {
        let entry = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| detail(StatusCode::UNAUTHORIZED, "not authenticated"))?;
        entry.nickname = Some(body.nickname);
        entry.profile_image_url = body.profile_image_url;
        entry.onboarded = true;
        entry.clone()
    };

    Ok(Json(me_body(&state, &updated)))
}

#[derive(Deserialize)]
struct ValueQuery {
    value: String,
}

async fn availability(
    State(db): State<Db>,
    Path(kind): Path<String>,
    Query(query): Query<ValueQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    auth_user(&state, &headers)?;
    let available = match kind.as_str() {
        "nickname" => !state
            .users
            .values()
            .any(|u| u.nickname.as_deref() == Some(query.value.as_str())),
        "blog-slug" => state.blog_by_slug(&query.value).is_none(),
        _ => return Err(detail(StatusCode::BAD_REQUEST, "unknown availability kind")),
    };
    let suggestion = (!available).then(|| format!("{}-2", query.value));
    Ok(Json(json!({ "available": available, "suggestion": suggestion })))
}

// ---------------------------------------------------------------------------
// Blogs and posts
// ---------------------------------------------------------------------------

async fn get_blog(State(db): State<Db>, Path(slug): Path<String>) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    let blog = state
        .blog_by_slug(&slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;
    Ok(Json(blog_body(&state, blog)))
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<u32>,
    size: Option<u32>,
    status: Option<String>,
    tag: Option<String>,
    category: Option<String>,
}

async fn list_posts(
    State(db): State<Db>,
    Path(slug): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    let blog = state
        .blog_by_slug(&slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    let mut matching: Vec<&Post> = state
        .posts
        .iter()
        .filter(|p| p.blog_id == blog.id)
        .filter(|p| query.status.as_deref().is_none_or(|s| p.status == s))
        .filter(|p| query.tag.as_deref().is_none_or(|t| p.tags.iter().any(|pt| pt == t)))
        .filter(|p| query.category.as_deref().is_none_or(|c| p.category == c))
        .collect();
    matching.sort_by(|a, b| b.id.cmp(&a.id));

    let total = matching.len();
    let page = query.page.unwrap_or(1).max(1);
    let size = query.size.unwrap_or(10).max(1);
    let items: Vec<Value> = matching
        .iter()
        .skip(((page - 1) * size) as usize)
        .take(size as usize)
        .map(|p| post_summary_body(&state, p))
        .collect();

    Ok(Json(json!({ "items": items, "total": total, "page": page, "size": size })))
}

async fn list_tags(State(db): State<Db>, Path(slug): Path<String>) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    let blog = state
        .blog_by_slug(&slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    let mut counts: Vec<(String, u64)> = Vec::new();
    for post in state.posts.iter().filter(|p| p.blog_id == blog.id) {
        for tag in &post.tags {
            match counts.iter_mut().find(|(slug, _)| slug == tag) {
                Some((_, count)) => *count += 1,
                None => counts.push((tag.clone(), 1)),
            }
        }
    }
    let body: Vec<Value> = counts
        .iter()
        .map(|(slug, count)| tag_body(&state, slug, Some(*count)))
        .collect();
    Ok(Json(json!(body)))
}

#[derive(Deserialize)]
struct CreatePostBody {
    title: String,
    #[serde(default)]
    slug: Option<String>,
    category: String,
    status: String,
    content_md: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

async fn create_post(
    State(db): State<Db>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    Json(body): Json<CreatePostBody>,
) -> Result<impl IntoResponse, ApiErr> {
    let mut state = db.write().await;
    let user = auth_user(&state, &headers)?;
    if !user.onboarded {
        return Err(detail(StatusCode::PRECONDITION_REQUIRED, "onboarding required"));
    }
    let blog = state
        .blog_by_slug(&slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;
    if blog.owner != user.id {
        return Err(detail(StatusCode::FORBIDDEN, "not your blog"));
    }
    let blog_id = blog.id;

    if body.title.trim().is_empty() {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "title required"));
    }
    if !matches!(body.status.as_str(), "draft" | "published" | "private") {
        return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "invalid status"));
    }

    let post_slug = body
        .slug
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| slugify(&body.title));
    if state
        .posts
        .iter()
        .any(|p| p.blog_id == blog_id && p.slug == post_slug)
    {
        return Err(detail(StatusCode::CONFLICT, "post slug already exists"));
    }

    let tags = body.tags.unwrap_or_default();
    state.register_tags(&tags);

    let post = Post {
        id: state.next_id(),
        blog_id,
        author: user.id,
        title: body.title,
        slug: post_slug,
        category: body.category,
        status: body.status.clone(),
        content_html: render_html(&body.content_md),
        content_md: body.content_md,
        excerpt: body.description,
        thumbnail_url: body.thumbnail_url,
        tags,
        likes: HashSet::new(),
        view_count: 0,
        created_at: MOCK_TIME.to_string(),
        updated_at: MOCK_TIME.to_string(),
        published_at: (body.status == "published").then(|| MOCK_TIME.to_string()),
    };

    let response = post_detail_body(&state, &post, Some(user.id));
    state.posts.push(post);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_post(
    State(db): State<Db>,
    Path((slug, post_slug)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiErr> {
    let mut state = db.write().await;
    let viewer_id = viewer(&state, &headers);
    let blog_id = state
        .blog_by_slug(&slug)
        .map(|b| b.id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    let idx = state
        .posts
        .iter()
        .position(|p| p.blog_id == blog_id && p.slug == post_slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    // Drafts and private posts are only visible to their author.
    if state.posts[idx].status != "published" && viewer_id != Some(state.posts[idx].author) {
        return Err(detail(StatusCode::NOT_FOUND, "not found"));
    }

    state.posts[idx].view_count += 1;
    let post = state.posts[idx].clone();
    Ok(Json(post_detail_body(&state, &post, viewer_id)))
}

#[derive(Deserialize)]
struct UpdatePostBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    content_md: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    thumbnail_url: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

async fn update_post(
    State(db): State<Db>,
    Path((slug, post_slug)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<UpdatePostBody>,
) -> Result<Json<Value>, ApiErr> {
    let mut state = db.write().await;
    let user = auth_user(&state, &headers)?;
    let blog_id = state
        .blog_by_slug(&slug)
        .map(|b| b.id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    let idx = state
        .posts
        .iter()
        .position(|p| p.blog_id == blog_id && p.slug == post_slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;
    if state.posts[idx].author != user.id {
        return Err(detail(StatusCode::FORBIDDEN, "not your post"));
    }

    if let Some(status) = &body.status {
        if !matches!(status.as_str(), "draft" | "published" | "private") {
            return Err(detail(StatusCode::UNPROCESSABLE_ENTITY, "invalid status"));
        }
    }
    if let Some(new_slug) = body.slug.as_deref().filter(|s| !s.trim().is_empty()) {
        if state
            .posts
            .iter()
            .any(|p| p.blog_id == blog_id && p.slug == new_slug && p.id != state.posts[idx].id)
        {
            return Err(detail(StatusCode::CONFLICT, "post slug already exists"));
        }
    }

    if let Some(tags) = &body.tags {
        state.register_tags(tags);
    }

    {
        let post = &mut state.posts[idx];
        if let Some(title) = body.title {
            post.title = title;
        }
        if let Some(new_slug) = body.slug.filter(|s| !s.trim().is_empty()) {
            post.slug = new_slug;
        }
        if let Some(category) = body.category {
            post.category = category;
        }
        if let Some(content_md) = body.content_md {
            post.content_html = render_html(&content_md);
            post.content_md = content_md;
        }
        if let Some(description) = body.description {
            post.excerpt = Some(description);
        }
        if let Some(thumbnail_url) = body.thumbnail_url {
            post.thumbnail_url = Some(thumbnail_url);
        }
        if let Some(tags) = body.tags {
            post.tags = tags;
        }
        if let Some(status) = body.status {
            if status == "published" && post.published_at.is_none() {
                post.published_at = Some(MOCK_TIME.to_string());
            }
            post.status = status;
        }
        post.updated_at = MOCK_TIME.to_string();
    }

    let post = state.posts[idx].clone();
    Ok(Json(post_detail_body(&state, &post, Some(user.id))))
}

async fn delete_post(
    State(db): State<Db>,
    Path((slug, post_slug)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiErr> {
    let mut state = db.write().await;
    let user = auth_user(&state, &headers)?;
    let blog_id = state
        .blog_by_slug(&slug)
        .map(|b| b.id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    let idx = state
        .posts
        .iter()
        .position(|p| p.blog_id == blog_id && p.slug == post_slug)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;
    if state.posts[idx].author != user.id {
        return Err(detail(StatusCode::FORBIDDEN, "not your post"));
    }

    let post_id = state.posts[idx].id;
    state.posts.remove(idx);
    state.comments.retain(|c| c.post_id != post_id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Comments and likes
// ---------------------------------------------------------------------------

async fn list_comments(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    if !state.posts.iter().any(|p| p.id == id) {
        return Err(detail(StatusCode::NOT_FOUND, "not found"));
    }
    let body: Vec<Value> = state
        .comments
        .iter()
        .filter(|c| c.post_id == id && c.parent_id.is_none())
        .map(|c| comment_body(&state, c))
        .collect();
    Ok(Json(json!(body)))
}

#[derive(Deserialize)]
struct CreateCommentBody {
    content: String,
    #[serde(default)]
    parent_id: Option<i64>,
}

async fn create_comment(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CreateCommentBody>,
) -> Result<impl IntoResponse, ApiErr> {
    let mut state = db.write().await;
    let user = auth_user(&state, &headers)?;
    if !state.posts.iter().any(|p| p.id == id) {
        return Err(detail(StatusCode::NOT_FOUND, "not found"));
    }
    if body.content.trim().is_empty() {
        return Err(detail(StatusCode::BAD_REQUEST, "content required"));
    }
    if let Some(parent_id) = body.parent_id {
        if !state
            .comments
            .iter()
            .any(|c| c.id == parent_id && c.post_id == id)
        {
            return Err(detail(StatusCode::NOT_FOUND, "parent comment not found"));
        }
    }

    let comment = Comment {
        id: state.next_id(),
        post_id: id,
        parent_id: body.parent_id,
        author: user.id,
        content: body.content,
        created_at: MOCK_TIME.to_string(),
        updated_at: MOCK_TIME.to_string(),
    };
    let response = comment_body(&state, &comment);
    state.comments.push(comment);
    Ok((StatusCode::CREATED, Json(response)))
}

async fn toggle_like(
    State(db): State<Db>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiErr> {
    let mut state = db.write().await;
    let user = auth_user(&state, &headers)?;
    let idx = state
        .posts
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "not found"))?;

    let post = &mut state.posts[idx];
    let liked = if post.likes.contains(&user.id) {
        post.likes.remove(&user.id);
        false
    } else {
        post.likes.insert(user.id);
        true
    };
    Ok(Json(json!({ "liked": liked, "like_count": post.likes.len() })))
}

// ---------------------------------------------------------------------------
// Trending
// ---------------------------------------------------------------------------

async fn trending_posts(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    let mut published: Vec<&Post> = state.posts.iter().filter(|p| p.status == "published").collect();
    published.sort_by(|a, b| {
        (b.likes.len(), b.view_count, b.id).cmp(&(a.likes.len(), a.view_count, a.id))
    });
    let body: Vec<Value> = published
        .iter()
        .take(10)
        .map(|p| post_summary_body(&state, p))
        .collect();
    Json(json!(body))
}

async fn trending_users(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    let mut entries: Vec<(&Blog, &User, u64)> = state
        .blogs
        .iter()
        .filter_map(|blog| {
            let owner = state.users.get(&blog.owner)?;
            let count = state
                .posts
                .iter()
                .filter(|p| p.blog_id == blog.id && p.status == "published")
                .count() as u64;
            (count > 0).then_some((blog, owner, count))
        })
        .collect();
    entries.sort_by(|a, b| b.2.cmp(&a.2));

    let body: Vec<Value> = entries
        .iter()
        .take(10)
        .map(|(blog, owner, count)| {
            json!({
                "id": owner.id,
                "nickname": owner.nickname.clone().unwrap_or_else(|| owner.email.clone()),
                "profile_image_url": owner.profile_image_url,
                "blog": blog_ref(blog),
                "post_count": count,
            })
        })
        .collect();
    Json(json!(body))
}

async fn trending_by_category(State(db): State<Db>) -> Json<Value> {
    let state = db.read().await;
    let mut categories: Vec<(String, Vec<&Post>)> = Vec::new();
    for post in state.posts.iter().filter(|p| p.status == "published") {
        match categories.iter_mut().find(|(name, _)| *name == post.category) {
            Some((_, posts)) => posts.push(post),
            None => categories.push((post.category.clone(), vec![post])),
        }
    }
    categories.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let body: Vec<Value> = categories
        .iter()
        .map(|(name, posts)| {
            json!({
                "category": name,
                "posts": posts.iter().map(|p| post_summary_body(&state, p)).collect::<Vec<_>>(),
            })
        })
        .collect();
    Json(json!(body))
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

async fn upload_signature(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiErr> {
    let state = db.read().await;
    auth_user(&state, &headers)?;
    Ok(Json(json!({
        "api_key": "mock-api-key",
        "timestamp": 1_700_000_000,
        "signature": Uuid::new_v4().simple().to_string(),
        "folder": "blog-uploads",
        "cloud_name": "mock-cloud",
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "post".to_string()
    } else {
        slug
    }
}

/// Paragraph-only rendering; fixtures never need more markdown than that.
fn render_html(content_md: &str) -> String {
    content_md
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .map(|p| format!("<p>{}</p>", p.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
