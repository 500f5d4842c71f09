//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use flock_core::{Comment, Post, User};
use serde::{Deserialize, Serialize};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// AUTH REQUEST/RESPONSE
// =============================================================================

/// Account registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authentication response, returned by both register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user_id: Option<u64>,
    pub token: Option<String>,
    pub expires_at: Option<u64>,
    pub error: Option<String>,
}

impl AuthResponse {
    pub fn success(user_id: u64, token: String, expires_at: u64) -> Self {
        Self {
            success: true,
            user_id: Some(user_id),
            token: Some(token),
            expires_at: Some(expires_at),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            user_id: None,
            token: None,
            expires_at: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// USER RESPONSE
// =============================================================================

/// Public user representation. The credential digest never leaves the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserJson {
    pub id: u64,
    pub user_name: String,
    pub email: String,
    pub followers: Vec<u64>,
    pub following: Vec<u64>,
}

impl UserJson {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.0,
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            followers: user.followers.iter().map(|u| u.0).collect(),
            following: user.following.iter().map(|u| u.0).collect(),
        }
    }
}

/// User detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: Option<UserJson>,
    pub error: Option<String>,
}

impl UserResponse {
    pub fn success(user: &User) -> Self {
        Self {
            success: true,
            user: Some(UserJson::from_user(user)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            error: Some(msg.into()),
        }
    }
}

/// User listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserJson>,
}

// =============================================================================
// RELATION RESPONSE
// =============================================================================

/// Follow/unfollow response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationResponse {
    pub success: bool,
    pub following: Option<bool>,
    pub target_followers: Option<usize>,
    pub error: Option<String>,
}

impl RelationResponse {
    pub fn success(following: bool, target_followers: usize) -> Self {
        Self {
            success: true,
            following: Some(following),
            target_followers: Some(target_followers),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            following: None,
            target_followers: None,
            error: Some(msg.into()),
        }
    }
}

/// Follower/following listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationListResponse {
    pub success: bool,
    pub users: Vec<u64>,
}

// =============================================================================
// POST REQUEST/RESPONSE
// =============================================================================

/// Post creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    #[serde(default)]
    pub media: Vec<String>,
}

/// Post update request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub content: String,
}

/// Comment creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

/// Comment JSON representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentJson {
    pub author: u64,
    pub content: String,
}

impl CommentJson {
    fn from_comment(comment: &Comment) -> Self {
        Self {
            author: comment.author.0,
            content: comment.content.clone(),
        }
    }
}

/// Post JSON representation. Likes and bookmarks are serialized as the
/// full membership sets; counts are derived client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostJson {
    pub id: u64,
    pub author: u64,
    pub content: String,
    pub media: Vec<String>,
    pub likes: Vec<u64>,
    pub bookmarks: Vec<u64>,
    pub comments: Vec<CommentJson>,
}

impl PostJson {
    pub fn from_post(post: &Post) -> Self {
        Self {
            id: post.id.0,
            author: post.author.0,
            content: post.content.clone(),
            media: post.media.clone(),
            likes: post.likes.iter().map(|u| u.0).collect(),
            bookmarks: post.bookmarks.iter().map(|u| u.0).collect(),
            comments: post.comments.iter().map(CommentJson::from_comment).collect(),
        }
    }
}

/// Post detail response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub success: bool,
    pub post: Option<PostJson>,
    pub error: Option<String>,
}

impl PostResponse {
    pub fn success(post: &Post) -> Self {
        Self {
            success: true,
            post: Some(PostJson::from_post(post)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            post: None,
            error: Some(msg.into()),
        }
    }
}

/// Post listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub success: bool,
    pub posts: Vec<PostJson>,
}

// =============================================================================
// ENGAGEMENT RESPONSE
// =============================================================================

/// Like/bookmark toggle response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementResponse {
    pub success: bool,
    pub engaged: Option<bool>,
    pub count: Option<usize>,
    pub error: Option<String>,
}

impl EngagementResponse {
    pub fn success(engaged: bool, count: usize) -> Self {
        Self {
            success: true,
            engaged: Some(engaged),
            count: Some(count),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            engaged: None,
            count: None,
            error: Some(msg.into()),
        }
    }
}

/// Bookmarked-post listing response (the derived per-user view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkListResponse {
    pub success: bool,
    pub posts: Vec<u64>,
}

// =============================================================================
// ADMIN RESPONSE
// =============================================================================

/// Network statistics response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub user_count: usize,
    pub post_count: usize,
    pub persistent: bool,
}

// =============================================================================
// GENERIC ERROR RESPONSE
// =============================================================================

/// Plain error envelope for endpoints without a richer response shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: msg.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use flock_core::{
        PostId, UserId,
        primitives::{MAX_CONTENT_LENGTH, MAX_USER_NAME_LENGTH},
    };

    #[test]
    fn post_json_carries_membership_sets() {
        let mut post = Post::new(PostId(1), UserId(2), "hello", vec![]);
        post.likes.insert(UserId(3));
        post.bookmarks.insert(UserId(4));

        let json = PostJson::from_post(&post);
        assert_eq!(json.likes, vec![3]);
        assert_eq!(json.bookmarks, vec![4]);
    }

    #[test]
    fn user_json_omits_credentials() {
        let user = User::new(UserId(1), "ada", "ada@example.com", [9u8; 32]);
        let json = UserJson::from_user(&user);
        let serialized = serde_json::to_string(&json).expect("serialize");
        assert!(!serialized.contains("digest"));
        assert!(!serialized.contains("credential"));
    }

    #[test]
    fn limits_are_sane() {
        // The API relies on the core limits for request validation.
        assert!(MAX_CONTENT_LENGTH >= 1000);
        assert!(MAX_USER_NAME_LENGTH >= 3);
    }
}
