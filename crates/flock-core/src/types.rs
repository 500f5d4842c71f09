//! # Core Type Definitions
//!
//! This module contains all core types for the Flock social-graph substrate:
//! - Identity newtypes (`UserId`, `PostId`)
//! - Stored records (`User`, `Post`, `Comment`)
//! - Mutation receipts (`RelationUpdate`, `EngagementUpdate`)
//! - Error types (`FlockError`)
//!
//! ## Determinism Guarantees
//!
//! All types in this module:
//! - Use integer identifiers only (no strings, no UUIDs)
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - Model every membership relation as a set, never a counter

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier for a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Unique identifier for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PostId(pub u64);

/// Keyed BLAKE3 digest of a user's credential. Never the plaintext.
pub type CredentialDigest = [u8; 32];

// =============================================================================
// USER
// =============================================================================

/// A registered user and both halves of their relationship state.
///
/// `following` is the authoritative half of a follow edge; `followers`
/// is the mirrored half kept consistent by the relationship engine.
///
/// Invariants:
/// - `id` is never a member of `followers` or `following` (no self-follow)
/// - `a ∈ b.followers ⟺ b ∈ a.following` after every completed mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The unique user identifier.
    pub id: UserId,
    /// Display name chosen at registration.
    pub user_name: String,
    /// Login email, unique across the store.
    pub email: String,
    /// Keyed digest of the login credential.
    pub credential_digest: CredentialDigest,
    /// Users who follow this user (mirrored half).
    pub followers: BTreeSet<UserId>,
    /// Users this user follows (authoritative half).
    pub following: BTreeSet<UserId>,
}

impl User {
    /// Create a fresh user record with empty relationship sets.
    #[must_use]
    pub fn new(
        id: UserId,
        user_name: impl Into<String>,
        email: impl Into<String>,
        credential_digest: CredentialDigest,
    ) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            email: email.into(),
            credential_digest,
            followers: BTreeSet::new(),
            following: BTreeSet::new(),
        }
    }
}

// =============================================================================
// POST
// =============================================================================

/// A comment appended to a post, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// The commenting user.
    pub author: UserId,
    /// Comment body.
    pub content: String,
}

/// A post and its engagement state.
///
/// `likes` and `bookmarks` are membership sets keyed by `UserId`.
/// The post-side `bookmarks` set is the single source of truth for
/// "who bookmarked what"; any per-user bookmark view is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// The unique post identifier.
    pub id: PostId,
    /// The owning user.
    pub author: UserId,
    /// Post body, bounded by `MAX_CONTENT_LENGTH`.
    pub content: String,
    /// Attached media references.
    pub media: Vec<String>,
    /// Users who liked this post.
    pub likes: BTreeSet<UserId>,
    /// Users who bookmarked this post (canonical bookmark store).
    pub bookmarks: BTreeSet<UserId>,
    /// Comments in insertion order.
    pub comments: Vec<Comment>,
}

impl Post {
    /// Create a fresh post with empty engagement state.
    #[must_use]
    pub fn new(id: PostId, author: UserId, content: impl Into<String>, media: Vec<String>) -> Self {
        Self {
            id,
            author,
            content: content.into(),
            media,
            likes: BTreeSet::new(),
            bookmarks: BTreeSet::new(),
            comments: Vec::new(),
        }
    }

    /// The membership set for the given engagement kind.
    #[must_use]
    pub fn engagement(&self, kind: EngagementKind) -> &BTreeSet<UserId> {
        match kind {
            EngagementKind::Like => &self.likes,
            EngagementKind::Bookmark => &self.bookmarks,
        }
    }

    /// Mutable access to the membership set for the given engagement kind.
    pub fn engagement_mut(&mut self, kind: EngagementKind) -> &mut BTreeSet<UserId> {
        match kind {
            EngagementKind::Like => &mut self.likes,
            EngagementKind::Bookmark => &mut self.bookmarks,
        }
    }
}

// =============================================================================
// ENGAGEMENT KIND
// =============================================================================

/// The two engagement relations a user can hold toward a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementKind {
    Like,
    Bookmark,
}

impl EngagementKind {
    /// Stable name for logging and receipts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Bookmark => "bookmark",
        }
    }
}

// =============================================================================
// MUTATION RECEIPTS
// =============================================================================

/// Receipt for a completed follow/unfollow mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationUpdate {
    /// The acting user.
    pub actor: UserId,
    /// The user whose follower set changed.
    pub target: UserId,
    /// Whether the edge exists after the mutation.
    pub following: bool,
    /// Size of `target.followers` after the mutation.
    pub target_followers: usize,
    /// Size of `actor.following` after the mutation.
    pub actor_following: usize,
}

/// Receipt for a completed like/bookmark toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementUpdate {
    /// The acting user.
    pub actor: UserId,
    /// The post whose membership set changed.
    pub post: PostId,
    /// Which relation was toggled.
    pub kind: EngagementKind,
    /// Whether the actor is a member after the mutation.
    pub engaged: bool,
    /// Size of the membership set after the mutation.
    pub count: usize,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Flock system.
///
/// - No silent failures
/// - Use `Result<T, FlockError>` for fallible operations
/// - The engines never panic; all errors are recoverable at the boundary
#[derive(Debug, Error)]
pub enum FlockError {
    /// The referenced user does not exist.
    #[error("User not found: {0:?}")]
    UserNotFound(UserId),

    /// The referenced post does not exist.
    #[error("Post not found: {0:?}")]
    PostNotFound(PostId),

    /// The mutation is structurally invalid (e.g. self-follow).
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// An add-toggle was applied to a membership that already holds.
    #[error("Already in state: membership already present")]
    AlreadyInState,

    /// A remove-toggle was applied to a membership that does not hold.
    #[error("Not in state: membership absent")]
    NotInState,

    /// Registration attempted with an email already in use.
    #[error("Email already registered")]
    EmailTaken,

    /// Login credentials did not match a stored digest.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A content mutation was attempted by a non-author.
    #[error("Operation restricted to the post author")]
    NotAuthor,

    /// A request field failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The persistence layer failed.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// The first half of a two-document write persisted but the second
    /// failed. The store is transiently asymmetric; a retry repairs it.
    #[error("Partial write: {completed} persisted, then: {failed}")]
    PartialWrite {
        /// What was already persisted.
        completed: &'static str,
        /// The failure that interrupted the second write.
        failed: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engagement_sets_select_correctly() {
        let mut post = Post::new(PostId(1), UserId(1), "hello", vec![]);
        post.engagement_mut(EngagementKind::Like).insert(UserId(2));
        post.engagement_mut(EngagementKind::Bookmark)
            .insert(UserId(3));

        assert!(post.engagement(EngagementKind::Like).contains(&UserId(2)));
        assert!(!post.engagement(EngagementKind::Like).contains(&UserId(3)));
        assert!(
            post.engagement(EngagementKind::Bookmark)
                .contains(&UserId(3))
        );
    }

    #[test]
    fn fresh_user_has_empty_relationship_sets() {
        let user = User::new(UserId(7), "ada", "ada@example.com", [0u8; 32]);
        assert!(user.followers.is_empty());
        assert!(user.following.is_empty());
    }

    #[test]
    fn membership_sets_are_deterministically_ordered() {
        let mut post = Post::new(PostId(1), UserId(1), "x", vec![]);
        post.likes.insert(UserId(3));
        post.likes.insert(UserId(1));
        post.likes.insert(UserId(2));

        let order: Vec<_> = post.likes.iter().copied().collect();
        assert_eq!(order, vec![UserId(1), UserId(2), UserId(3)]);
    }

    #[test]
    fn engagement_kind_names() {
        assert_eq!(EngagementKind::Like.as_str(), "like");
        assert_eq!(EngagementKind::Bookmark.as_str(), "bookmark");
    }
}
