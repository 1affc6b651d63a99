//! API integration tests.
//!
//! Each test drives the full router (auth middleware included) against a
//! mock database, so route order, extractors and redirect semantics are
//! exercised end to end.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::LOCATION},
};
use chrono::Utc;
use http_body_util::BodyExt;
use quill_api::{
    middleware::{AppState, auth_middleware},
    router as api_router,
};
use quill_common::{
    LocalStorage,
    config::{BlogConfig, Config, DatabaseConfig, ServerConfig, StorageConfig},
};
use quill_core::{
    CommentService, FollowService, MediaService, PostService, ProfileService, UserService,
};
use quill_db::{
    entities::{post, user},
    repositories::{
        CommentRepository, FollowRepository, PostRepository, ProfileRepository, UserRepository,
    },
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        storage: StorageConfig::default(),
        blog: BlogConfig::default(),
    }
}

/// Build app state over a prepared mock connection.
fn create_test_state(db: Arc<DatabaseConnection>) -> AppState {
    let config = Arc::new(create_test_config());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    let storage = Arc::new(LocalStorage::new(
        PathBuf::from("./target/test-media"),
        "/media".to_string(),
    ));

    AppState {
        user_service: UserService::new(user_repo.clone(), profile_repo.clone()),
        post_service: PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            comment_repo.clone(),
            &config,
        ),
        profile_service: ProfileService::new(
            profile_repo,
            user_repo.clone(),
            post_repo.clone(),
            follow_repo.clone(),
            &config,
        ),
        comment_service: CommentService::new(comment_repo, post_repo, user_repo.clone()),
        follow_service: FollowService::new(follow_repo, user_repo),
        media_service: MediaService::new(storage),
        config,
    }
}

fn create_test_router(db: Arc<DatabaseConnection>) -> Router {
    let state = create_test_state(db);
    api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn test_user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        email: format!("{username}@example.com"),
        username: username.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        token: Some("token123".to_string()),
        is_admin: false,
        is_active: true,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn test_post(id: &str, author_id: &str, slug: &str, status: post::Status) -> post::Model {
    post::Model {
        id: id.to_string(),
        author_id: author_id.to_string(),
        title: "My Title".to_string(),
        body: Some("Body text".to_string()),
        feature_image: None,
        slug: slug.to_string(),
        status: status.clone(),
        published: match status {
            post::Status::Published => Some(Utc::now().into()),
            post::Status::Draft => None,
        },
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

fn location_of(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn test_index_empty() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_anonymous_create_redirects_to_login() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/add")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"My Title"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_authenticated_create_redirects_to_draft_preview() {
    let author = test_user("u1", "testuser");
    let created = test_post("p1", "u1", "my-title", post::Status::Draft);

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            // token lookup, existing slugs (none), insert returning
            .append_query_results([[author]])
            .append_query_results([Vec::<post::Model>::new()])
            .append_query_results([[created]])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/add")
                .method("POST")
                .header("Authorization", "Bearer token123")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"title":"My Title"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location_of(&response).as_deref(),
        Some("/testuser/my-title/draft")
    );
}

#[tokio::test]
async fn test_anonymous_draft_url_is_generic_404() {
    let author = test_user("u1", "alice");
    let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[author]])
            .append_query_results([[draft]])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/alice/my-title")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("Oops! We couldn't find that page"));
    // Nothing about the hidden post may leak
    assert!(!body.contains("draft"));
    assert!(!body.contains("alice"));
}

#[tokio::test]
async fn test_missing_post_has_identical_404_body() {
    let author = test_user("u1", "alice");
    let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

    let hidden_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[author.clone()]])
            .append_query_results([[draft]])
            .into_connection(),
    );
    let missing_db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[author]])
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection(),
    );

    let hidden = create_test_router(hidden_db)
        .oneshot(
            Request::builder()
                .uri("/alice/my-title")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let missing = create_test_router(missing_db)
        .oneshot(
            Request::builder()
                .uri("/alice/no-such-post")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(hidden.status(), StatusCode::NOT_FOUND);
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let hidden_body = hidden.into_body().collect().await.unwrap().to_bytes();
    let missing_body = missing.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(hidden_body, missing_body);
}

#[tokio::test]
async fn test_author_draft_url_redirects_to_preview() {
    let author = test_user("u1", "alice");
    let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            // token lookup, author lookup, post lookup
            .append_query_results([[author.clone()]])
            .append_query_results([[author]])
            .append_query_results([[draft]])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/alice/my-title")
                .header("Authorization", "Bearer token123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        location_of(&response).as_deref(),
        Some("/alice/my-title/draft")
    );
}

#[tokio::test]
async fn test_publish_redirects_to_public_url() {
    let author = test_user("u1", "alice");
    let draft = test_post("p1", "u1", "my-title", post::Status::Draft);
    let published = test_post("p1", "u1", "my-title", post::Status::Published);

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[author.clone()]])
            .append_query_results([[author]])
            .append_query_results([[draft]])
            .append_query_results([[published]])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/alice/my-title/publish")
                .method("POST")
                .header("Authorization", "Bearer token123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response).as_deref(), Some("/alice/my-title"));
}

#[tokio::test]
async fn test_non_author_publish_is_404() {
    let author = test_user("u1", "alice");
    let intruder = test_user("u2", "mallory");
    let draft = test_post("p1", "u1", "my-title", post::Status::Draft);

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[intruder]])
            .append_query_results([[author]])
            .append_query_results([[draft]])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/alice/my-title/publish")
                .method("POST")
                .header("Authorization", "Bearer token123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let alice = test_user("u1", "alice");

    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[alice]])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/alice/follow")
                .method("POST")
                .header("Authorization", "Bearer token123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_author_page_is_404() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection(),
    );
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_logout_requires_login() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/logout")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location_of(&response).as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_register_with_invalid_json_is_rejected() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}
