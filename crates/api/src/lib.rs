//! HTTP layer for quill.
//!
//! This crate provides the blog's HTTP surface:
//!
//! - **Endpoints**: index, post lifecycle, profiles, follows, auth
//! - **Extractors**: required and optional authentication
//! - **Middleware**: bearer-token resolution
//!
//! Handlers return render-context JSON or `302 Found` redirects; HTML
//! rendering is left to an external presentation layer. Built on Axum 0.8
//! with a Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
