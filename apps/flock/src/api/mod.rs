//! # Flock HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! Public:
//! - `GET /health` - Health check
//! - `POST /register` - Create an account, returns a token
//! - `POST /login` - Verify credentials, returns a token
//! - `GET /users` / `GET /users/{id}` - User listing and detail
//! - `GET /users/{id}/followers` / `GET /users/{id}/following` - Relation views
//! - `GET /posts` / `GET /posts/{id}` - Post listing and detail
//!
//! Protected (Bearer token):
//! - `PUT /users/{id}/follow` / `PUT /users/{id}/unfollow`
//! - `POST /posts`, `PUT /posts/{id}`, `DELETE /posts/{id}`
//! - `PUT /posts/{id}/like` / `unlike` / `bookmark` / `unbookmark`
//! - `POST /posts/{id}/comments`
//! - `GET /bookmarks` - The caller's derived bookmark view
//! - `GET /admin/stats` - Network statistics
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `FLOCK_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `FLOCK_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `FLOCK_TOKEN_SECRET`: Token signing secret (default: development secret, with a warning)
//! - `FLOCK_TOKEN_TTL_SECS`: Token lifetime in seconds (default: 86400)

mod auth;
mod handlers;
mod middleware;
mod types;

// Re-exports for external use
pub use auth::{AuthConfig, AuthedUser, IssuedToken};
pub use middleware::Throttle;
// Re-export handlers and types for integration tests (via `flock::api::*`)
#[allow(unused_imports)]
pub use handlers::{
    bookmark_handler, bookmarks_handler, comment_handler, create_post_handler,
    delete_post_handler, follow_handler, followers_handler, following_handler, health_handler,
    like_handler, login_handler, post_handler, posts_handler, register_handler, stats_handler,
    unbookmark_handler, unfollow_handler, unlike_handler, update_post_handler, user_handler,
    users_handler,
};
#[allow(unused_imports)]
pub use types::{
    AuthResponse, BookmarkListResponse, CommentJson, CommentRequest, CreatePostRequest,
    EngagementResponse, ErrorResponse, HealthResponse, LoginRequest, PostJson, PostListResponse,
    PostResponse, RegisterRequest, RelationListResponse, RelationResponse, StatsResponse,
    UpdatePostRequest, UserJson, UserListResponse, UserResponse,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post, put},
};
use flock_core::{FlockError, Network};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state: the network service plus the token config.
#[derive(Clone)]
pub struct AppState {
    /// The network service behind a write-serializing lock.
    pub network: Arc<RwLock<Network>>,
    /// Token issuing/verification configuration.
    pub auth: AuthConfig,
}

impl AppState {
    /// Create new app state with a network and an explicit auth config.
    #[must_use]
    pub fn new(network: Network, auth: AuthConfig) -> Self {
        Self {
            network: Arc::new(RwLock::new(network)),
            auth,
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `FLOCK_CORS_ORIGINS` environment variable:
/// - If "*": allows all origins (development mode - use with caution!)
/// - If not set: defaults to localhost only (restrictive default)
/// - Otherwise: parses comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("FLOCK_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (FLOCK_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in FLOCK_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No FLOCK_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let localhost_origins = vec![
        "http://localhost:3000".parse::<HeaderValue>().ok(),
        "http://localhost:8080".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:3000".parse::<HeaderValue>().ok(),
        "http://127.0.0.1:8080".parse::<HeaderValue>().ok(),
    ];
    let origins: Vec<HeaderValue> = localhost_origins.into_iter().flatten().collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. CORS - handles preflight requests
/// 2. Tracing - logs all requests
/// 3. Rate Limiting - protects against abuse (if enabled)
/// 4. Token authentication - protected routes only
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let throttle = Throttle::from_env();
    match &throttle {
        Some(t) => tracing::info!(
            "Rate limiting enabled: {} requests/second",
            t.requests_per_second()
        ),
        None => tracing::info!("Rate limiting disabled"),
    }

    // Routes reachable without a token
    let public = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/users", get(handlers::users_handler))
        .route("/users/{id}", get(handlers::user_handler))
        .route("/users/{id}/followers", get(handlers::followers_handler))
        .route("/users/{id}/following", get(handlers::following_handler))
        .route("/posts", get(handlers::posts_handler))
        .route("/posts/{id}", get(handlers::post_handler));

    // Routes requiring a verified Bearer token
    let protected = Router::new()
        .route("/users/{id}/follow", put(handlers::follow_handler))
        .route("/users/{id}/unfollow", put(handlers::unfollow_handler))
        .route("/posts", post(handlers::create_post_handler))
        .route(
            "/posts/{id}",
            put(handlers::update_post_handler).delete(handlers::delete_post_handler),
        )
        .route("/posts/{id}/like", put(handlers::like_handler))
        .route("/posts/{id}/unlike", put(handlers::unlike_handler))
        .route("/posts/{id}/bookmark", put(handlers::bookmark_handler))
        .route("/posts/{id}/unbookmark", put(handlers::unbookmark_handler))
        .route("/posts/{id}/comments", post(handlers::comment_handler))
        .route("/bookmarks", get(handlers::bookmarks_handler))
        .route("/admin/stats", get(handlers::stats_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth::require_auth,
        ));

    let mut router = public.merge(protected);

    // Apply throttling middleware
    if let Some(throttle) = throttle {
        router = router.layer(axum_middleware::from_fn_with_state(
            throttle,
            middleware::throttle_middleware,
        ));
    }

    // Apply CORS, body limit, and tracing (outermost layers)
    router
        .layer(axum::extract::DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, network: Network, auth: AuthConfig) -> Result<(), FlockError> {
    let state = AppState::new(network, auth);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| FlockError::StorageFailure(format!("Bind failed: {}", e)))?;

    tracing::info!("Flock HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| FlockError::StorageFailure(format!("Server error: {}", e)))
}
