//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every write path takes the network write lock; reads take the read
//! lock. Concurrent duplicate toggles therefore serialize, and the
//! second caller receives the conflict signal from the core.

use super::{
    AppState,
    auth::AuthedUser,
    types::{
        AuthResponse, BookmarkListResponse, CommentRequest, CreatePostRequest, EngagementResponse,
        ErrorResponse, HealthResponse, LoginRequest, PostListResponse, PostResponse,
        RegisterRequest, RelationListResponse, RelationResponse, StatsResponse, UpdatePostRequest,
        UserListResponse, UserResponse,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use flock_core::{FlockError, PostId, UserId};
use std::time::SystemTime;

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Map a core error to the HTTP status that carries it.
///
/// Conflict-class errors (duplicate toggle, absent toggle, taken email)
/// map to 409 so clients can distinguish "already done" from "failed".
fn error_status(error: &FlockError) -> StatusCode {
    match error {
        FlockError::UserNotFound(_) | FlockError::PostNotFound(_) => StatusCode::NOT_FOUND,
        FlockError::InvalidOperation(_) | FlockError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        FlockError::AlreadyInState | FlockError::NotInState | FlockError::EmailTaken => {
            StatusCode::CONFLICT
        }
        FlockError::InvalidCredentials | FlockError::NotAuthor => StatusCode::FORBIDDEN,
        FlockError::StorageFailure(_)
        | FlockError::PartialWrite { .. }
        | FlockError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// ACCOUNT HANDLERS
// =============================================================================

/// Register a new account and issue a token.
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.register(&request.user_name, &request.email, &request.password) {
        Ok(user_id) => {
            tracing::info!(event = "user_registered", user_id = user_id.0);
            let issued = state.auth.issue_token(user_id, SystemTime::now());
            (
                StatusCode::CREATED,
                Json(AuthResponse::success(
                    user_id.0,
                    issued.token,
                    issued.expires_at,
                )),
            )
        }
        Err(e) => (error_status(&e), Json(AuthResponse::error(e.to_string()))),
    }
}

/// Verify credentials and issue a token.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.verify_credentials(&request.email, &request.password) {
        Ok(user_id) => {
            tracing::info!(event = "user_login", user_id = user_id.0);
            let issued = state.auth.issue_token(user_id, SystemTime::now());
            (
                StatusCode::OK,
                Json(AuthResponse::success(
                    user_id.0,
                    issued.token,
                    issued.expires_at,
                )),
            )
        }
        Err(e) => (error_status(&e), Json(AuthResponse::error(e.to_string()))),
    }
}

/// List all users.
pub async fn users_handler(State(state): State<AppState>) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.users() {
        Ok(users) => (
            StatusCode::OK,
            Json(UserListResponse {
                success: true,
                users: users
                    .iter()
                    .map(super::types::UserJson::from_user)
                    .collect(),
            }),
        )
            .into_response(),
        Err(e) => (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

/// Get a single user.
pub async fn user_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.user(UserId(id)) {
        Ok(user) => (StatusCode::OK, Json(UserResponse::success(&user))),
        Err(e) => (error_status(&e), Json(UserResponse::error(e.to_string()))),
    }
}

// =============================================================================
// RELATIONSHIP HANDLERS
// =============================================================================

/// Follow a user.
pub async fn follow_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.follow(actor, UserId(id)) {
        Ok(update) => {
            tracing::info!(
                event = "follow",
                actor = actor.0,
                target = id,
                target_followers = update.target_followers
            );
            (
                StatusCode::OK,
                Json(RelationResponse::success(
                    update.following,
                    update.target_followers,
                )),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(RelationResponse::error(e.to_string())),
        ),
    }
}

/// Unfollow a user.
pub async fn unfollow_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.unfollow(actor, UserId(id)) {
        Ok(update) => {
            tracing::info!(event = "unfollow", actor = actor.0, target = id);
            (
                StatusCode::OK,
                Json(RelationResponse::success(
                    update.following,
                    update.target_followers,
                )),
            )
        }
        Err(e) => (
            error_status(&e),
            Json(RelationResponse::error(e.to_string())),
        ),
    }
}

/// List a user's followers.
pub async fn followers_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.followers_of(UserId(id)) {
        Ok(users) => (
            StatusCode::OK,
            Json(RelationListResponse {
                success: true,
                users: users.iter().map(|u| u.0).collect(),
            }),
        )
            .into_response(),
        Err(e) => (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

/// List the users a user follows.
pub async fn following_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.following_of(UserId(id)) {
        Ok(users) => (
            StatusCode::OK,
            Json(RelationListResponse {
                success: true,
                users: users.iter().map(|u| u.0).collect(),
            }),
        )
            .into_response(),
        Err(e) => (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

// =============================================================================
// CONTENT HANDLERS
// =============================================================================

/// Create a post.
pub async fn create_post_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Json(request): Json<CreatePostRequest>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.create_post(actor, &request.content, request.media) {
        Ok(post_id) => {
            tracing::info!(event = "post_created", author = actor.0, post_id = post_id.0);
            match network.post(post_id) {
                Ok(post) => (StatusCode::CREATED, Json(PostResponse::success(&post))),
                Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
            }
        }
        Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
    }
}

/// List all posts.
pub async fn posts_handler(State(state): State<AppState>) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.posts() {
        Ok(posts) => (
            StatusCode::OK,
            Json(PostListResponse {
                success: true,
                posts: posts
                    .iter()
                    .map(super::types::PostJson::from_post)
                    .collect(),
            }),
        )
            .into_response(),
        Err(e) => (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

/// Get a single post.
pub async fn post_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.post(PostId(id)) {
        Ok(post) => (StatusCode::OK, Json(PostResponse::success(&post))),
        Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
    }
}

/// Update a post's body. Author only.
pub async fn update_post_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
    Json(request): Json<UpdatePostRequest>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    let post = PostId(id);
    let media = match network.post(post) {
        Ok(rec) => rec.media,
        Err(e) => return (error_status(&e), Json(PostResponse::error(e.to_string()))),
    };
    match network.update_post(actor, post, &request.content, media) {
        Ok(()) => match network.post(post) {
            Ok(rec) => (StatusCode::OK, Json(PostResponse::success(&rec))),
            Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
        },
        Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
    }
}

/// Delete a post. Author only.
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.delete_post(actor, PostId(id)) {
        Ok(()) => {
            tracing::info!(event = "post_deleted", actor = actor.0, post_id = id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response()
        }
    }
}

/// Append a comment to a post.
pub async fn comment_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
    Json(request): Json<CommentRequest>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    let post = PostId(id);
    match network.add_comment(actor, post, &request.content) {
        Ok(()) => match network.post(post) {
            Ok(rec) => (StatusCode::CREATED, Json(PostResponse::success(&rec))),
            Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
        },
        Err(e) => (error_status(&e), Json(PostResponse::error(e.to_string()))),
    }
}

// =============================================================================
// ENGAGEMENT HANDLERS
// =============================================================================

/// Like a post.
pub async fn like_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.like(actor, PostId(id)) {
        Ok(update) => (
            StatusCode::OK,
            Json(EngagementResponse::success(update.engaged, update.count)),
        ),
        Err(e) => (
            error_status(&e),
            Json(EngagementResponse::error(e.to_string())),
        ),
    }
}

/// Withdraw a like.
pub async fn unlike_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.unlike(actor, PostId(id)) {
        Ok(update) => (
            StatusCode::OK,
            Json(EngagementResponse::success(update.engaged, update.count)),
        ),
        Err(e) => (
            error_status(&e),
            Json(EngagementResponse::error(e.to_string())),
        ),
    }
}

/// Bookmark a post.
pub async fn bookmark_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.bookmark(actor, PostId(id)) {
        Ok(update) => (
            StatusCode::OK,
            Json(EngagementResponse::success(update.engaged, update.count)),
        ),
        Err(e) => (
            error_status(&e),
            Json(EngagementResponse::error(e.to_string())),
        ),
    }
}

/// Withdraw a bookmark.
pub async fn unbookmark_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
    Path(id): Path<u64>,
) -> impl IntoResponse {
    let mut network = state.network.write().await;
    match network.unbookmark(actor, PostId(id)) {
        Ok(update) => (
            StatusCode::OK,
            Json(EngagementResponse::success(update.engaged, update.count)),
        ),
        Err(e) => (
            error_status(&e),
            Json(EngagementResponse::error(e.to_string())),
        ),
    }
}

/// The caller's bookmarked posts, derived from the post-side sets.
pub async fn bookmarks_handler(
    State(state): State<AppState>,
    Extension(AuthedUser(actor)): Extension<AuthedUser>,
) -> impl IntoResponse {
    let network = state.network.read().await;
    match network.bookmarks_of(actor) {
        Ok(posts) => (
            StatusCode::OK,
            Json(BookmarkListResponse {
                success: true,
                posts: posts.iter().map(|p| p.0).collect(),
            }),
        )
            .into_response(),
        Err(e) => (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}

// =============================================================================
// ADMIN HANDLERS
// =============================================================================

/// Network statistics.
pub async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    let network = state.network.read().await;
    let counts = network
        .user_count()
        .and_then(|users| network.post_count().map(|posts| (users, posts)));
    match counts {
        Ok((user_count, post_count)) => (
            StatusCode::OK,
            Json(StatsResponse {
                user_count,
                post_count,
                persistent: network.is_persistent(),
            }),
        )
            .into_response(),
        Err(e) => (error_status(&e), Json(ErrorResponse::new(e.to_string()))).into_response(),
    }
}
