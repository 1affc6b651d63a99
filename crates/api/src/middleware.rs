//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use quill_common::Config;
use quill_core::{
    CommentService, FollowService, MediaService, PostService, ProfileService, UserService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub profile_service: ProfileService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub media_service: MediaService,
    pub config: Arc<Config>,
}

/// Authentication middleware.
///
/// Resolves the `Authorization: Bearer` token to a user and stashes the
/// model in request extensions; unauthenticated requests pass through and
/// are rejected per route by the [`crate::extractors::AuthUser`] extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(user) = state.user_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
