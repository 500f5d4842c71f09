//! # redb-backed Social Store
//!
//! A disk-backed `SocialStore` using the redb embedded database:
//! - ACID transactions (every `put_*` is one committed transaction)
//! - Crash safety (copy-on-write B-trees)
//! - MVCC (concurrent readers, single writer)
//! - Zero configuration
//!
//! Records are postcard-serialized. An in-memory email index is kept
//! for fast login lookups and rebuilt from disk on open.

use crate::store::SocialStore;
use crate::{CredentialDigest, FlockError, Post, PostId, User, UserId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeMap;
use std::path::Path;

/// Table for users: UserId(u64) -> serialized User bytes
const USERS: TableDefinition<u64, &[u8]> = TableDefinition::new("users");

/// Table for posts: PostId(u64) -> serialized Post bytes
const POSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("posts");

/// Table for the login index: email -> UserId(u64)
const EMAIL_INDEX: TableDefinition<&str, u64> = TableDefinition::new("email_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

fn io_err(e: impl std::fmt::Display) -> FlockError {
    FlockError::StorageFailure(e.to_string())
}

fn ser_err(e: impl std::fmt::Display) -> FlockError {
    FlockError::SerializationError(e.to_string())
}

/// A disk-backed social store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// In-memory email -> user id index for fast login lookups.
    email_cache: BTreeMap<String, UserId>,
    /// Next available user id.
    next_user_id: u64,
    /// Next available post id.
    next_post_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("email_cache_size", &self.email_cache.len())
            .field("next_user_id", &self.next_user_id)
            .field("next_post_id", &self.next_post_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FlockError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(USERS).map_err(io_err)?;
            let _ = write_txn.open_table(POSTS).map_err(io_err)?;
            let _ = write_txn.open_table(EMAIL_INDEX).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let read_txn = db.begin_read().map_err(io_err)?;

        let (next_user_id, next_post_id) = {
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            let next_user = table
                .get("next_user_id")
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            let next_post = table
                .get("next_post_id")
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            (next_user, next_post)
        };

        // Rebuild the email cache from disk
        let email_cache = {
            let table = read_txn.open_table(EMAIL_INDEX).map_err(io_err)?;
            let mut cache = BTreeMap::new();
            for entry in table.iter().map_err(io_err)? {
                let (key, value) = entry.map_err(io_err)?;
                cache.insert(key.value().to_string(), UserId(value.value()));
            }
            cache
        };

        Ok(Self {
            db,
            email_cache,
            next_user_id,
            next_post_id,
        })
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), FlockError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }
}

impl SocialStore for RedbStore {
    fn insert_user(
        &mut self,
        user_name: &str,
        email: &str,
        credential_digest: CredentialDigest,
    ) -> Result<UserId, FlockError> {
        if self.email_cache.contains_key(email) {
            return Err(FlockError::EmailTaken);
        }

        let id = UserId(self.next_user_id);
        let user = User::new(id, user_name, email, credential_digest);
        let bytes = postcard::to_allocvec(&user).map_err(ser_err)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut users_table = write_txn.open_table(USERS).map_err(io_err)?;
            users_table.insert(id.0, bytes.as_slice()).map_err(io_err)?;

            let mut email_table = write_txn.open_table(EMAIL_INDEX).map_err(io_err)?;
            email_table.insert(email, id.0).map_err(io_err)?;

            let mut meta_table = write_txn.open_table(METADATA).map_err(io_err)?;
            meta_table
                .insert("next_user_id", id.0.saturating_add(1))
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.email_cache.insert(email.to_string(), id);
        self.next_user_id = self.next_user_id.saturating_add(1);
        Ok(id)
    }

    fn get_user(&self, id: UserId) -> Result<Option<User>, FlockError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(USERS).map_err(io_err)?;
        match table.get(id.0).map_err(io_err)? {
            Some(bytes) => {
                let user = postcard::from_bytes(bytes.value()).map_err(ser_err)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    fn put_user(&mut self, user: &User) -> Result<(), FlockError> {
        let bytes = postcard::to_allocvec(user).map_err(ser_err)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(USERS).map_err(io_err)?;
            if table.get(user.id.0).map_err(io_err)?.is_none() {
                return Err(FlockError::UserNotFound(user.id));
            }
            table
                .insert(user.id.0, bytes.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn user_by_email(&self, email: &str) -> Result<Option<UserId>, FlockError> {
        Ok(self.email_cache.get(email).copied())
    }

    fn users(&self) -> Result<Vec<User>, FlockError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(USERS).map_err(io_err)?;
        let mut users = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            users.push(postcard::from_bytes(value.value()).map_err(ser_err)?);
        }
        Ok(users)
    }

    fn insert_post(
        &mut self,
        author: UserId,
        content: &str,
        media: Vec<String>,
    ) -> Result<PostId, FlockError> {
        let id = PostId(self.next_post_id);
        let post = Post::new(id, author, content, media);
        let bytes = postcard::to_allocvec(&post).map_err(ser_err)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let users_table = write_txn.open_table(USERS).map_err(io_err)?;
            if users_table.get(author.0).map_err(io_err)?.is_none() {
                return Err(FlockError::UserNotFound(author));
            }
            drop(users_table);

            let mut posts_table = write_txn.open_table(POSTS).map_err(io_err)?;
            posts_table.insert(id.0, bytes.as_slice()).map_err(io_err)?;

            let mut meta_table = write_txn.open_table(METADATA).map_err(io_err)?;
            meta_table
                .insert("next_post_id", id.0.saturating_add(1))
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.next_post_id = self.next_post_id.saturating_add(1);
        Ok(id)
    }

    fn get_post(&self, id: PostId) -> Result<Option<Post>, FlockError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(POSTS).map_err(io_err)?;
        match table.get(id.0).map_err(io_err)? {
            Some(bytes) => {
                let post = postcard::from_bytes(bytes.value()).map_err(ser_err)?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    fn put_post(&mut self, post: &Post) -> Result<(), FlockError> {
        let bytes = postcard::to_allocvec(post).map_err(ser_err)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(POSTS).map_err(io_err)?;
            if table.get(post.id.0).map_err(io_err)?.is_none() {
                return Err(FlockError::PostNotFound(post.id));
            }
            table
                .insert(post.id.0, bytes.as_slice())
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    fn delete_post(&mut self, id: PostId) -> Result<bool, FlockError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let removed = {
            let mut table = write_txn.open_table(POSTS).map_err(io_err)?;
            table.remove(id.0).map_err(io_err)?.is_some()
        };
        write_txn.commit().map_err(io_err)?;
        Ok(removed)
    }

    fn posts(&self) -> Result<Vec<Post>, FlockError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(POSTS).map_err(io_err)?;
        let mut posts = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            posts.push(postcard::from_bytes(value.value()).map_err(ser_err)?);
        }
        Ok(posts)
    }

    fn user_count(&self) -> Result<usize, FlockError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(USERS).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }

    fn post_count(&self) -> Result<usize, FlockError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(POSTS).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engagement::EngagementEngine;
    use crate::relationship::RelationshipEngine;
    use tempfile::NamedTempFile;

    const DIGEST: CredentialDigest = [9u8; 32];

    fn open_store() -> (RedbStore, NamedTempFile) {
        let file = NamedTempFile::new().expect("temp file");
        let store = RedbStore::open(file.path()).expect("open");
        (store, file)
    }

    #[test]
    fn user_roundtrip_survives_reopen() {
        let file = NamedTempFile::new().expect("temp file");
        let id = {
            let mut store = RedbStore::open(file.path()).expect("open");
            store
                .insert_user("ada", "ada@example.com", DIGEST)
                .expect("insert")
        };

        let store = RedbStore::open(file.path()).expect("reopen");
        let user = store.get_user(id).expect("get").expect("present");
        assert_eq!(user.user_name, "ada");
        assert_eq!(
            store.user_by_email("ada@example.com").expect("by email"),
            Some(id)
        );
    }

    #[test]
    fn id_allocation_survives_reopen() {
        let file = NamedTempFile::new().expect("temp file");
        let first = {
            let mut store = RedbStore::open(file.path()).expect("open");
            store
                .insert_user("ada", "ada@example.com", DIGEST)
                .expect("insert")
        };

        let mut store = RedbStore::open(file.path()).expect("reopen");
        let second = store
            .insert_user("bob", "bob@example.com", DIGEST)
            .expect("insert");
        assert!(second > first);
    }

    #[test]
    fn duplicate_email_rejected_on_disk() {
        let (mut store, _file) = open_store();
        store
            .insert_user("ada", "ada@example.com", DIGEST)
            .expect("insert");
        let second = store.insert_user("eve", "ada@example.com", DIGEST);
        assert!(matches!(second, Err(FlockError::EmailTaken)));
    }

    #[test]
    fn follow_persists_both_halves() {
        let (mut store, _file) = open_store();
        let a = store
            .insert_user("ada", "ada@example.com", DIGEST)
            .expect("insert");
        let b = store
            .insert_user("bob", "bob@example.com", DIGEST)
            .expect("insert");

        RelationshipEngine::follow(&mut store, a, b).expect("follow");

        let a_rec = store.get_user(a).expect("get").expect("present");
        let b_rec = store.get_user(b).expect("get").expect("present");
        assert!(a_rec.following.contains(&b));
        assert!(b_rec.followers.contains(&a));
    }

    #[test]
    fn engagement_persists_across_reopen() {
        let file = NamedTempFile::new().expect("temp file");
        let (user, post) = {
            let mut store = RedbStore::open(file.path()).expect("open");
            let user = store
                .insert_user("ada", "ada@example.com", DIGEST)
                .expect("insert");
            let post = store.insert_post(user, "hello", vec![]).expect("post");
            EngagementEngine::like(&mut store, user, post).expect("like");
            EngagementEngine::bookmark(&mut store, user, post).expect("bookmark");
            (user, post)
        };

        let store = RedbStore::open(file.path()).expect("reopen");
        let rec = store.get_post(post).expect("get").expect("present");
        assert!(rec.likes.contains(&user));
        assert!(rec.bookmarks.contains(&user));
    }

    #[test]
    fn delete_post_removes_record() {
        let (mut store, _file) = open_store();
        let user = store
            .insert_user("ada", "ada@example.com", DIGEST)
            .expect("insert");
        let post = store.insert_post(user, "hello", vec![]).expect("post");

        assert!(store.delete_post(post).expect("delete"));
        assert!(store.get_post(post).expect("get").is_none());
        assert!(!store.delete_post(post).expect("delete twice"));
    }

    #[test]
    fn insert_post_rejects_unknown_author() {
        let (mut store, _file) = open_store();
        let result = store.insert_post(UserId(7), "hello", vec![]);
        assert!(matches!(result, Err(FlockError::UserNotFound(UserId(7)))));
        assert_eq!(store.post_count().expect("count"), 0);
    }
}
