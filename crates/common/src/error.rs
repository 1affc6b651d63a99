//! Error types for quill.

use axum::{
    Json,
    http::{StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    /// Resource absent, or access deliberately hidden. Always rendered as a
    /// generic 404 so callers cannot distinguish "does not exist" from
    /// "exists but is private". The inner detail is for logs only.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation requires a signed-in user. Rendered as a redirect to
    /// the login page, leaking nothing about the target resource.
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid credentials")]
    Unauthorized,

    /// Post title normalized to an empty slug.
    #[error("Title must contain at least one slug-safe character")]
    InvalidTitle,

    /// Crop rectangle outside image bounds, non-positive dimensions, or
    /// undecodable image data.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage-layer constraint violation (e.g. a slug collision under
    /// concurrent writes). Retryable by the caller.
    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AuthenticationRequired => StatusCode::FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidTitle | Self::InvalidImage(_) | Self::BadRequest(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidTitle => "INVALID_TITLE",
            Self::InvalidImage(_) => "INVALID_IMAGE",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        match self {
            // Identical body for every 404: an unauthorized draft must be
            // indistinguishable from a nonexistent post.
            Self::NotFound(_) => {
                let body = Json(json!({
                    "error": {
                        "code": "NOT_FOUND",
                        "message": "Oops! We couldn't find that page",
                    }
                }));
                (StatusCode::NOT_FOUND, body).into_response()
            }
            Self::AuthenticationRequired => {
                (StatusCode::FOUND, [(LOCATION, "/login")]).into_response()
            }
            _ => {
                let body = Json(json!({
                    "error": {
                        "code": code,
                        "message": self.to_string(),
                    }
                }));
                (status, body).into_response()
            }
        }
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
