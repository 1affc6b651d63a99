//! Post endpoints: index, author pages, detail, and the full draft ->
//! published lifecycle.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use quill_common::{AppResult, Config};
use quill_core::{CreateCommentInput, CreatePostInput, PostDetail, UpdatePostInput};
use quill_db::entities::{comment, post, user};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, found},
};

/// Post render context.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub title: String,
    pub body: Option<String>,
    pub slug: String,
    pub status: String,
    pub author: String,
    pub author_name: String,
    pub feature_image_url: String,
    pub published: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl PostResponse {
    fn new(post: post::Model, author: &user::Model, config: &Config) -> Self {
        let feature_image_url = image_url(config, post.feature_image.as_deref());
        Self {
            title: post.title,
            body: post.body,
            slug: post.slug,
            status: match post.status {
                post::Status::Draft => "draft".to_string(),
                post::Status::Published => "published".to_string(),
            },
            author: author.username.clone(),
            author_name: format!("{} {}", author.first_name, author.last_name),
            feature_image_url,
            published: post.published.map(|dt| dt.to_rfc3339()),
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

/// Comment render context.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: String,
    pub author_id: String,
    pub body: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(comment: comment::Model) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            body: comment.body,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

/// Index render context.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub posts: Vec<PostResponse>,
}

/// Author page render context.
#[derive(Debug, Serialize)]
pub struct AuthorPageResponse {
    pub author: String,
    pub author_name: String,
    pub posts: Vec<PostResponse>,
}

/// Post detail render context.
#[derive(Debug, Serialize)]
pub struct DetailResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// Public URL for a feature image, falling back to the configured
/// placeholder.
fn image_url(config: &Config, key: Option<&str>) -> String {
    let key = key.unwrap_or(&config.blog.placeholder_image);
    format!("{}/{key}", config.storage.base_url.trim_end_matches('/'))
}

/// `GET /` — all published posts, most recent first.
pub async fn index(State(state): State<AppState>) -> AppResult<ApiResponse<IndexResponse>> {
    let posts = state.post_service.index().await?;

    let posts = posts
        .into_iter()
        .map(|entry| PostResponse::new(entry.post, &entry.author, &state.config))
        .collect();

    Ok(ApiResponse::ok(IndexResponse { posts }))
}

/// `GET /{username}` — an author's published posts.
pub async fn author_page(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<ApiResponse<AuthorPageResponse>> {
    let (author, posts) = state.post_service.author_page(&username).await?;

    let posts = posts
        .into_iter()
        .map(|post| PostResponse::new(post, &author, &state.config))
        .collect();

    Ok(ApiResponse::ok(AuthorPageResponse {
        author: author.username.clone(),
        author_name: format!("{} {}", author.first_name, author.last_name),
        posts,
    }))
}

/// `GET /{username}/{slug}` — public post detail.
///
/// The author of a draft is redirected to the draft preview; anyone else
/// hitting a draft URL gets the generic 404.
pub async fn detail(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
) -> AppResult<Response> {
    let detail = state
        .post_service
        .detail(caller.as_ref(), &username, &slug)
        .await?;

    match detail {
        PostDetail::Page {
            post,
            author,
            comments,
        } => {
            let response = DetailResponse {
                post: PostResponse::new(post, &author, &state.config),
                comments: comments.into_iter().map(CommentResponse::from).collect(),
            };
            Ok(ApiResponse::ok(response).into_response())
        }
        PostDetail::DraftRedirect { username, slug } => Ok(found(&format!("/{username}/{slug}/draft"))),
    }
}

/// `GET|POST /{username}/{slug}/draft` — author-only preview.
pub async fn draft_preview(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
) -> AppResult<ApiResponse<PostResponse>> {
    let preview = state
        .post_service
        .draft_preview(&user, &username, &slug)
        .await?;

    Ok(ApiResponse::ok(PostResponse::new(
        preview.post,
        &preview.author,
        &state.config,
    )))
}

/// `GET /add` — new-post form context (requires login).
pub async fn add_form(AuthUser(_user): AuthUser) -> ApiResponse<serde_json::Value> {
    ApiResponse::ok(serde_json::json!({ "form": "post" }))
}

/// `POST /add` — create a draft, then bounce to its preview.
pub async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<Response> {
    let post = state.post_service.create(&user, input).await?;
    Ok(found(&format!("/{}/{}/draft", user.username, post.slug)))
}

/// `GET /{username}/{slug}/edit` — edit form context (author only).
pub async fn edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
) -> AppResult<ApiResponse<PostResponse>> {
    let preview = state
        .post_service
        .draft_preview(&user, &username, &slug)
        .await?;

    Ok(ApiResponse::ok(PostResponse::new(
        preview.post,
        &preview.author,
        &state.config,
    )))
}

/// `POST /{username}/{slug}/edit` — apply an edit, then bounce to the
/// draft preview (the slug may have changed with the title).
pub async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
    Json(input): Json<UpdatePostInput>,
) -> AppResult<Response> {
    let post = state
        .post_service
        .update(&user, &username, &slug, input)
        .await?;

    Ok(found(&format!("/{}/{}/draft", user.username, post.slug)))
}

/// `POST /{username}/{slug}/publish` — publish, then bounce to the public
/// URL.
pub async fn publish(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
) -> AppResult<Response> {
    let post = state.post_service.publish(&user, &username, &slug).await?;
    Ok(found(&format!("/{}/{}", user.username, post.slug)))
}

/// `POST /{username}/{slug}/delete` — delete, then bounce to the index.
pub async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
) -> AppResult<Response> {
    state.post_service.delete(&user, &username, &slug).await?;
    Ok(found("/"))
}

/// `POST /{username}/{slug}/comment` — comment on a published post, then
/// bounce back to it.
pub async fn comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((username, slug)): Path<(String, String)>,
    Json(input): Json<CreateCommentInput>,
) -> AppResult<Response> {
    state
        .comment_service
        .create(&user, &username, &slug, input)
        .await?;

    Ok(found(&format!("/{username}/{slug}")))
}
