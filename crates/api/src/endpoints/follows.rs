//! Follow endpoints.

use axum::{
    extract::{Path, State},
    response::Response,
};
use quill_common::AppResult;

use crate::{extractors::AuthUser, middleware::AppState, response::found};

/// `POST /{username}/follow` — follow an author, then bounce to their
/// page.
pub async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.follow(&user, &username).await?;
    Ok(found(&format!("/{username}")))
}

/// `POST /{username}/unfollow` — stop following an author.
pub async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state.follow_service.unfollow(&user, &username).await?;
    Ok(found(&format!("/{username}")))
}
