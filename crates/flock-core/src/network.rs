//! # Network Module
//!
//! The `Network` is the single entry point the app layer holds: it owns
//! a storage backend and dispatches account, content, relationship and
//! engagement operations into the engines.
//!
//! ## Storage Backends
//!
//! Network supports two storage backends:
//! - `InMemory`: uses `MemoryStore` (fast, volatile)
//! - `Persistent`: uses `RedbStore` for disk-backed ACID storage

use crate::engagement::EngagementEngine;
use crate::primitives::{
    MAX_COMMENT_LENGTH, MAX_CONTENT_LENGTH, MAX_EMAIL_LENGTH, MAX_MEDIA_ITEMS,
    MAX_MEDIA_REF_LENGTH, MAX_USER_NAME_LENGTH,
};
use crate::relationship::RelationshipEngine;
use crate::storage::RedbStore;
use crate::store::{MemoryStore, SocialStore};
use crate::{
    Comment, EngagementUpdate, FlockError, Post, PostId, RelationUpdate, User, UserId,
};
use std::path::Path;

/// Storage backend for a Network.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned.

/// Dispatch a store operation against whichever backend is active.
macro_rules! with_store {
    ($self:expr, $store:ident => $body:expr) => {
        match &mut $self.backend {
            StorageBackend::InMemory($store) => $body,
            StorageBackend::Persistent($store) => $body,
        }
    };
}

/// Dispatch a read-only store operation against whichever backend is active.
macro_rules! with_store_ref {
    ($self:expr, $store:ident => $body:expr) => {
        match &$self.backend {
            StorageBackend::InMemory($store) => $body,
            StorageBackend::Persistent($store) => $body,
        }
    };
}

/// The social network service.
#[derive(Debug, Default)]
pub struct Network {
    /// The storage backend (in-memory or persistent).
    backend: StorageBackend,
}

impl Network {
    /// Create a new network with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a network over an existing in-memory store.
    #[must_use]
    pub fn with_store(store: MemoryStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// Create a network with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path.
    /// All changes are automatically persisted to disk.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, FlockError> {
        let store = RedbStore::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(store),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn backend(&self) -> &StorageBackend {
        &self.backend
    }

    // =========================================================================
    // ACCOUNTS
    // =========================================================================

    /// Register a new account. Rejects duplicate emails and oversized
    /// fields; stores a keyed credential digest, never the plaintext.
    #[cfg(feature = "crypto-hash")]
    pub fn register(
        &mut self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserId, FlockError> {
        validate_field("user_name", user_name, MAX_USER_NAME_LENGTH)?;
        validate_field("email", email, MAX_EMAIL_LENGTH)?;
        if password.is_empty() {
            return Err(FlockError::InvalidInput("password must not be empty".into()));
        }
        if !email.contains('@') {
            return Err(FlockError::InvalidInput("email is malformed".into()));
        }

        if self.user_by_email(email)?.is_some() {
            return Err(FlockError::EmailTaken);
        }

        let digest = crate::credentials::digest_credentials(email, password);
        with_store!(self, store => store.insert_user(user_name, email, digest))
    }

    /// Verify login credentials, returning the account id on success.
    #[cfg(feature = "crypto-hash")]
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<UserId, FlockError> {
        let Some(id) = self.user_by_email(email)? else {
            return Err(FlockError::InvalidCredentials);
        };
        let user = self.user(id)?;
        crate::credentials::verify_credentials(email, password, &user.credential_digest)?;
        Ok(id)
    }

    /// Load a user record.
    pub fn user(&self, id: UserId) -> Result<User, FlockError> {
        with_store_ref!(self, store => store.get_user(id))?.ok_or(FlockError::UserNotFound(id))
    }

    /// Look up a user id by email.
    pub fn user_by_email(&self, email: &str) -> Result<Option<UserId>, FlockError> {
        with_store_ref!(self, store => store.user_by_email(email))
    }

    /// All users in deterministic id order.
    pub fn users(&self) -> Result<Vec<User>, FlockError> {
        with_store_ref!(self, store => store.users())
    }

    // =========================================================================
    // CONTENT
    // =========================================================================

    /// Create a post owned by `author`.
    pub fn create_post(
        &mut self,
        author: UserId,
        content: &str,
        media: Vec<String>,
    ) -> Result<PostId, FlockError> {
        validate_content(content, &media)?;
        with_store!(self, store => store.insert_post(author, content, media))
    }

    /// Replace the body of a post. Author-gated.
    pub fn update_post(
        &mut self,
        actor: UserId,
        post: PostId,
        content: &str,
        media: Vec<String>,
    ) -> Result<(), FlockError> {
        validate_content(content, &media)?;
        with_store!(self, store => {
            let mut rec = store
                .get_post(post)?
                .ok_or(FlockError::PostNotFound(post))?;
            if rec.author != actor {
                return Err(FlockError::NotAuthor);
            }
            rec.content = content.to_string();
            rec.media = media;
            store.put_post(&rec)
        })
    }

    /// Delete a post. Author-gated.
    pub fn delete_post(&mut self, actor: UserId, post: PostId) -> Result<(), FlockError> {
        with_store!(self, store => {
            let rec = store
                .get_post(post)?
                .ok_or(FlockError::PostNotFound(post))?;
            if rec.author != actor {
                return Err(FlockError::NotAuthor);
            }
            store.delete_post(post)?;
            Ok(())
        })
    }

    /// Load a post record.
    pub fn post(&self, id: PostId) -> Result<Post, FlockError> {
        with_store_ref!(self, store => store.get_post(id))?.ok_or(FlockError::PostNotFound(id))
    }

    /// All posts in deterministic id order.
    pub fn posts(&self) -> Result<Vec<Post>, FlockError> {
        with_store_ref!(self, store => store.posts())
    }

    /// Append a comment to a post.
    pub fn add_comment(
        &mut self,
        actor: UserId,
        post: PostId,
        content: &str,
    ) -> Result<(), FlockError> {
        validate_field("comment", content, MAX_COMMENT_LENGTH)?;
        with_store!(self, store => {
            store
                .get_user(actor)?
                .ok_or(FlockError::UserNotFound(actor))?;
            let mut rec = store
                .get_post(post)?
                .ok_or(FlockError::PostNotFound(post))?;
            rec.comments.push(Comment {
                author: actor,
                content: content.to_string(),
            });
            store.put_post(&rec)
        })
    }

    // =========================================================================
    // RELATIONSHIPS
    // =========================================================================

    /// Create the follow edge `actor -> target`.
    pub fn follow(&mut self, actor: UserId, target: UserId) -> Result<RelationUpdate, FlockError> {
        with_store!(self, store => RelationshipEngine::follow(store, actor, target))
    }

    /// Remove the follow edge `actor -> target`.
    pub fn unfollow(
        &mut self,
        actor: UserId,
        target: UserId,
    ) -> Result<RelationUpdate, FlockError> {
        with_store!(self, store => RelationshipEngine::unfollow(store, actor, target))
    }

    /// Follower ids of a user, in deterministic order.
    pub fn followers_of(&self, user: UserId) -> Result<Vec<UserId>, FlockError> {
        Ok(self.user(user)?.followers.into_iter().collect())
    }

    /// Followed ids of a user, in deterministic order.
    pub fn following_of(&self, user: UserId) -> Result<Vec<UserId>, FlockError> {
        Ok(self.user(user)?.following.into_iter().collect())
    }

    // =========================================================================
    // ENGAGEMENT
    // =========================================================================

    /// Like a post.
    pub fn like(&mut self, actor: UserId, post: PostId) -> Result<EngagementUpdate, FlockError> {
        with_store!(self, store => EngagementEngine::like(store, actor, post))
    }

    /// Withdraw a like.
    pub fn unlike(&mut self, actor: UserId, post: PostId) -> Result<EngagementUpdate, FlockError> {
        with_store!(self, store => EngagementEngine::unlike(store, actor, post))
    }

    /// Bookmark a post.
    pub fn bookmark(
        &mut self,
        actor: UserId,
        post: PostId,
    ) -> Result<EngagementUpdate, FlockError> {
        with_store!(self, store => EngagementEngine::bookmark(store, actor, post))
    }

    /// Withdraw a bookmark.
    pub fn unbookmark(
        &mut self,
        actor: UserId,
        post: PostId,
    ) -> Result<EngagementUpdate, FlockError> {
        with_store!(self, store => EngagementEngine::unbookmark(store, actor, post))
    }

    /// Derived "my bookmarks" view from the canonical post-side sets.
    pub fn bookmarks_of(&self, user: UserId) -> Result<Vec<PostId>, FlockError> {
        with_store_ref!(self, store => EngagementEngine::bookmarks_of(store, user))
    }

    // =========================================================================
    // METRICS
    // =========================================================================

    /// Total number of users.
    pub fn user_count(&self) -> Result<usize, FlockError> {
        with_store_ref!(self, store => store.user_count())
    }

    /// Total number of posts.
    pub fn post_count(&self) -> Result<usize, FlockError> {
        with_store_ref!(self, store => store.post_count())
    }
}

fn validate_field(name: &str, value: &str, max: usize) -> Result<(), FlockError> {
    if value.is_empty() {
        return Err(FlockError::InvalidInput(format!("{name} must not be empty")));
    }
    if value.len() > max {
        return Err(FlockError::InvalidInput(format!(
            "{name} length {} exceeds maximum {} bytes",
            value.len(),
            max
        )));
    }
    Ok(())
}

fn validate_content(content: &str, media: &[String]) -> Result<(), FlockError> {
    validate_field("content", content, MAX_CONTENT_LENGTH)?;
    if media.len() > MAX_MEDIA_ITEMS {
        return Err(FlockError::InvalidInput(format!(
            "media item count {} exceeds maximum {}",
            media.len(),
            MAX_MEDIA_ITEMS
        )));
    }
    for item in media {
        validate_field("media reference", item, MAX_MEDIA_REF_LENGTH)?;
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
