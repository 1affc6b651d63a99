//! Auth endpoints: registration, login, logout.

use axum::{Json, extract::State, response::Response};
use quill_common::AppResult;
use quill_core::CreateUserInput;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, found},
};

/// Register request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub input: CreateUserInput,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the bearer token for subsequent requests.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// Register a new account, then bounce to the login page.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Response> {
    state.user_service.create(req.input).await?;
    Ok(found("/login"))
}

/// Verify credentials and issue a fresh token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user = state.user_service.login(&req.email, &req.password).await?;

    // A token is always present right after login
    let token = user.token.unwrap_or_default();

    Ok(ApiResponse::ok(LoginResponse {
        token,
        username: user.username,
    }))
}

/// Invalidate the caller's token, then bounce to the index.
pub async fn logout(AuthUser(user): AuthUser, State(state): State<AppState>) -> AppResult<Response> {
    state.user_service.logout(user).await?;
    Ok(found("/"))
}
