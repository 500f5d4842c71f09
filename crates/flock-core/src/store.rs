//! # Store Seam
//!
//! The `SocialStore` trait is the engines' only view of persistence.
//!
//! All fallible operations return `Result<T, FlockError>` to support
//! both in-memory and persistent storage backends uniformly. Every
//! `put_*` call is a single-document atomic write; the engines build
//! their multi-document contracts on top of that guarantee.

use crate::{CredentialDigest, FlockError, Post, PostId, User, UserId};
use std::collections::BTreeMap;

// =============================================================================
// SOCIALSTORE TRAIT
// =============================================================================

/// Durable record access for users and posts.
pub trait SocialStore {
    /// Allocate an id and persist a fresh user record.
    fn insert_user(
        &mut self,
        user_name: &str,
        email: &str,
        credential_digest: CredentialDigest,
    ) -> Result<UserId, FlockError>;

    /// Load a user by id. `Ok(None)` if absent.
    fn get_user(&self, id: UserId) -> Result<Option<User>, FlockError>;

    /// Persist a full user record, replacing the stored one.
    fn put_user(&mut self, user: &User) -> Result<(), FlockError>;

    /// Look up a user id by login email.
    fn user_by_email(&self, email: &str) -> Result<Option<UserId>, FlockError>;

    /// All users in deterministic id order.
    fn users(&self) -> Result<Vec<User>, FlockError>;

    /// Allocate an id and persist a fresh post record.
    fn insert_post(
        &mut self,
        author: UserId,
        content: &str,
        media: Vec<String>,
    ) -> Result<PostId, FlockError>;

    /// Load a post by id. `Ok(None)` if absent.
    fn get_post(&self, id: PostId) -> Result<Option<Post>, FlockError>;

    /// Persist a full post record, replacing the stored one.
    fn put_post(&mut self, post: &Post) -> Result<(), FlockError>;

    /// Remove a post. Returns `false` if it was absent.
    fn delete_post(&mut self, id: PostId) -> Result<bool, FlockError>;

    /// All posts in deterministic id order.
    fn posts(&self) -> Result<Vec<Post>, FlockError>;

    /// Total number of users.
    fn user_count(&self) -> Result<usize, FlockError>;

    /// Total number of posts.
    fn post_count(&self) -> Result<usize, FlockError>;
}

// =============================================================================
// MEMORYSTORE IMPLEMENTATION
// =============================================================================

/// In-memory store backed by `BTreeMap` for deterministic ordering.
///
/// Volatile: state is lost on drop. The persistent counterpart is
/// `crate::storage::RedbStore`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// User records: UserId -> User
    users: BTreeMap<UserId, User>,

    /// Post records: PostId -> Post
    posts: BTreeMap<PostId, Post>,

    /// Login index: email -> UserId
    email_index: BTreeMap<String, UserId>,

    /// Next available UserId
    next_user_id: u64,

    /// Next available PostId
    next_post_id: u64,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SocialStore for MemoryStore {
    fn insert_user(
        &mut self,
        user_name: &str,
        email: &str,
        credential_digest: CredentialDigest,
    ) -> Result<UserId, FlockError> {
        if self.email_index.contains_key(email) {
            return Err(FlockError::EmailTaken);
        }

        let id = UserId(self.next_user_id);
        self.next_user_id = self.next_user_id.saturating_add(1);

        let user = User::new(id, user_name, email, credential_digest);
        self.email_index.insert(email.to_string(), id);
        self.users.insert(id, user);

        Ok(id)
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>, FlockError> {
        Ok(self.users.get(&id).cloned())
    }

    fn put_user(&mut self, user: &User) -> Result<(), FlockError> {
        if !self.users.contains_key(&user.id) {
            return Err(FlockError::UserNotFound(user.id));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<UserId>, FlockError> {
        Ok(self.email_index.get(email).copied())
    }

    fn users(&self) -> Result<Vec<User>, FlockError> {
        Ok(self.users.values().cloned().collect())
    }

    fn insert_post(
        &mut self,
        author: UserId,
        content: &str,
        media: Vec<String>,
    ) -> Result<PostId, FlockError> {
        if !self.users.contains_key(&author) {
            return Err(FlockError::UserNotFound(author));
        }

        let id = PostId(self.next_post_id);
        self.next_post_id = self.next_post_id.saturating_add(1);

        let post = Post::new(id, author, content, media);
        self.posts.insert(id, post);

        Ok(id)
    }

    fn get_post(&self, id: PostId) -> Result<Option<Post>, FlockError> {
        Ok(self.posts.get(&id).cloned())
    }

    fn put_post(&mut self, post: &Post) -> Result<(), FlockError> {
        if !self.posts.contains_key(&post.id) {
            return Err(FlockError::PostNotFound(post.id));
        }
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    fn delete_post(&mut self, id: PostId) -> Result<bool, FlockError> {
        Ok(self.posts.remove(&id).is_some())
    }

    fn posts(&self) -> Result<Vec<Post>, FlockError> {
        Ok(self.posts.values().cloned().collect())
    }

    fn user_count(&self) -> Result<usize, FlockError> {
        Ok(self.users.len())
    }

    fn post_count(&self) -> Result<usize, FlockError> {
        Ok(self.posts.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
