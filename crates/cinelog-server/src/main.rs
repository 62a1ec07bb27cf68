use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router, extract::DefaultBodyLimit, middleware,
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use cinelog_api::config::Config;
use cinelog_api::middleware::require_auth;
use cinelog_api::state::{AppState, AppStateInner};
use cinelog_api::{analysis, analytics, auth, favorites, movies, reviews, users};
use cinelog_db::Store;
use cinelog_types::models::UserDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinelog=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::load()?;

    // Connect and prepare the database
    let store = Store::connect(&config.mongodb_url, &config.db_name).await?;
    store.ensure_indexes().await?;

    if config.dataset_path.exists() {
        store.load_dataset(&config.dataset_path).await?;
    } else {
        warn!(
            "Dataset {} not found, catalog starts empty",
            config.dataset_path.display()
        );
    }

    // Seed the admin account on first start, if a password was configured
    if let Some(password) = &config.admin_password {
        let admin = UserDoc {
            id: Uuid::new_v4().to_string(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: auth::hash_password(password)?,
            is_admin: true,
            avatar: None,
            created_at: Utc::now(),
        };
        store.seed_admin(admin).await?;
    }

    let host = config.host.clone();
    let port = config.port;
    let upload_dir = config.upload_dir.clone();

    let state: AppState = Arc::new(AppStateInner { store, config });

    // Routes
    let public_routes = Router::new()
        .route("/api/users/register", post(auth::register))
        .route("/token", post(auth::token))
        .route("/api/movies", get(movies::list_movies))
        .route("/api/movies/genres/stats", get(movies::genre_stats))
        .route("/api/movies/{movie_id}", get(movies::get_movie))
        .route("/api/reviews/movie/{movie_id}", get(reviews::movie_reviews))
        .route(
            "/api/analysis/sentiment/{movie_id}",
            get(analysis::movie_sentiment),
        )
        .route(
            "/api/analysis/word-cloud/{movie_id}",
            get(analysis::movie_word_cloud),
        )
        .route("/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/users", get(users::list_users))
        .route("/api/users/me", get(users::me))
        .route("/api/users/me/activity", get(users::my_activity))
        .route("/api/users/profile", put(users::update_profile))
        .route("/api/users/password", put(users::change_password))
        // Lifted above the handler's cap so the size check answers oversize
        // uploads instead of the transport limit
        .route(
            "/api/users/avatar",
            post(users::upload_avatar).layer(DefaultBodyLimit::max(users::AVATAR_BODY_LIMIT)),
        )
        .route("/api/reviews", post(reviews::create_review))
        .route("/api/reviews/user/me", get(reviews::my_reviews))
        .route("/api/reviews/{review_id}", delete(reviews::delete_review))
        .route("/api/favorites", get(favorites::list_favorites))
        .route(
            "/api/favorites/check/{movie_id}",
            get(favorites::check_favorite),
        )
        // POST takes a movie id, DELETE a favorite id; one pattern serves both
        .route(
            "/api/favorites/{id}",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/api/analysis/user-activity", get(analysis::user_activity))
        .route("/api/analytics/reviews", get(analytics::review_analytics))
        .route(
            "/api/analytics/reviews/list",
            get(analytics::review_listing),
        )
        .route("/api/analytics/movies", get(analytics::movie_analytics))
        .route("/api/analytics/users", get(analytics::user_analytics))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", ServeDir::new(&upload_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Cinelog server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // All router clones are gone once serve returns
    if let Some(inner) = Arc::into_inner(state) {
        inner.store.shutdown().await;
    }
    info!("Shutdown complete");

    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
