//! API endpoints.

mod auth;
mod follows;
mod posts;
mod profiles;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::AppState;

/// Create the application router.
///
/// Static routes are registered ahead of the `/{username}` captures, so
/// `/add`, `/profile` and the auth routes can never be shadowed by an
/// author page.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::index))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/add", get(posts::add_form).post(posts::create))
        .route("/profile", get(profiles::own_page))
        .route("/profile/edit", post(profiles::edit))
        .route("/profile/photo", post(profiles::upload_profile_picture))
        .route("/profile/cover", post(profiles::upload_cover_photo))
        .route("/{username}", get(posts::author_page))
        .route("/{username}/follow", post(follows::follow))
        .route("/{username}/unfollow", post(follows::unfollow))
        .route("/{username}/{slug}", get(posts::detail))
        .route(
            "/{username}/{slug}/draft",
            get(posts::draft_preview).post(posts::draft_preview),
        )
        .route("/{username}/{slug}/publish", post(posts::publish))
        .route(
            "/{username}/{slug}/edit",
            get(posts::edit_form).post(posts::update),
        )
        .route("/{username}/{slug}/delete", post(posts::delete))
        .route("/{username}/{slug}/comment", post(posts::comment))
}
