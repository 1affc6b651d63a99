//! Quill server entry point.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware};
use quill_api::{AppState, router as api_router};
use quill_common::{Config, LocalStorage};
use quill_core::{
    CommentService, FollowService, MediaService, PostService, ProfileService, UserService,
};
use quill_db::repositories::{
    CommentRepository, FollowRepository, PostRepository, ProfileRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local .env is optional
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting quill server...");

    // Load configuration
    let config = Arc::new(Config::load()?);

    // Connect to database and run migrations
    let db = quill_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    quill_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // File storage for cropped photos and feature images
    let storage = Arc::new(LocalStorage::new(
        PathBuf::from(&config.storage.base_path),
        config.storage.base_url.clone(),
    ));

    // Initialize services
    let user_service = UserService::new(user_repo.clone(), profile_repo.clone());
    let post_service = PostService::new(
        post_repo.clone(),
        user_repo.clone(),
        comment_repo.clone(),
        &config,
    );
    let profile_service = ProfileService::new(
        profile_repo,
        user_repo.clone(),
        post_repo.clone(),
        follow_repo.clone(),
        &config,
    );
    let comment_service = CommentService::new(comment_repo, post_repo, user_repo.clone());
    let follow_service = FollowService::new(follow_repo, user_repo);
    let media_service = MediaService::new(storage);

    let state = AppState {
        user_service,
        post_service,
        profile_service,
        comment_service,
        follow_service,
        media_service,
        config: Arc::clone(&config),
    };

    // Build router: API routes plus static serving of uploaded media
    let media_route = config.storage.base_url.trim_end_matches('/').to_string();
    let app = Router::new()
        .merge(api_router())
        .nest_service(&media_route, ServeDir::new(&config.storage.base_path))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            quill_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
