//! Profile endpoints: own profile page, edits, and cropped photo uploads.

use axum::{
    Json,
    extract::{Multipart, State},
    response::Response,
};
use quill_common::{AppError, AppResult, Config};
use quill_core::{CropRect, PhotoKind, ProfilePage, UpdateProfileInput};
use serde::Serialize;
use serde_json::json;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, found},
};

/// Profile page render context.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub name: String,
    pub blog_title: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
    pub profile_picture_url: Option<String>,
    pub cover_photo_url: Option<String>,
    pub post_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
}

impl ProfileResponse {
    fn new(page: ProfilePage, config: &Config) -> Self {
        let base = config.storage.base_url.trim_end_matches('/');
        let url = |key: &String| format!("{base}/{key}");

        Self {
            username: page.user.username,
            name: format!("{} {}", page.user.first_name, page.user.last_name),
            blog_title: page.profile.blog_title,
            bio: page.profile.bio,
            location: page.location,
            website: page.profile.website,
            twitter: page.profile.twitter,
            github: page.profile.github,
            profile_picture_url: page.profile.profile_picture.as_ref().map(url),
            cover_photo_url: page.profile.cover_photo.as_ref().map(url),
            post_count: page.post_count,
            followers_count: page.followers_count,
            following_count: page.following_count,
        }
    }
}

/// `GET /profile` — the caller's own profile page.
pub async fn own_page(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let page = state.profile_service.page(&user.username).await?;
    Ok(ApiResponse::ok(ProfileResponse::new(page, &state.config)))
}

/// `POST /profile/edit` — update profile fields, then bounce back.
pub async fn edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<Response> {
    state.profile_service.update(&user, input).await?;
    Ok(found("/profile"))
}

/// `POST /profile/photo` — upload and crop the 200x200 profile picture.
pub async fn upload_profile_picture(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    upload_photo(&state, &user, PhotoKind::ProfilePicture, multipart).await
}

/// `POST /profile/cover` — upload and crop the 1920x300 cover photo.
pub async fn upload_cover_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    upload_photo(&state, &user, PhotoKind::CoverPhoto, multipart).await
}

/// Shared multipart handling for both photo slots: an image part plus the
/// crop rectangle the browser-side cropper selected.
async fn upload_photo(
    state: &AppState,
    user: &quill_db::entities::user::Model,
    kind: PhotoKind,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut data: Option<Vec<u8>> = None;
    let mut x: Option<f64> = None;
    let mut y: Option<f64> = None;
    let mut width: Option<f64> = None;
    let mut height: Option<f64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {e}")))?;
                data = Some(bytes.to_vec());
            }
            "x" | "y" | "width" | "height" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read field: {e}")))?;
                let value: f64 = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid crop value for {name}")))?;
                match name.as_str() {
                    "x" => x = Some(value),
                    "y" => y = Some(value),
                    "width" => width = Some(value),
                    _ => height = Some(value),
                }
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| AppError::BadRequest("Missing photo".to_string()))?;
    let rect = match (x, y, width, height) {
        (Some(x), Some(y), Some(width), Some(height)) => CropRect {
            x,
            y,
            width,
            height,
        },
        _ => return Err(AppError::BadRequest("Missing crop rectangle".to_string())),
    };

    let file = state
        .media_service
        .store_photo(&user.username, kind, &data, rect)
        .await?;
    let photo_url = state.profile_service.set_photo(user, kind, file.key).await?;

    Ok(Json(json!({
        "status": "SUCCESS",
        "photo_url": photo_url,
    })))
}
