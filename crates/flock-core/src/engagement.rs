//! # Engagement Engine
//!
//! Toggles membership of a user in a post's like set or bookmark set.
//!
//! Both relations are modeled as sets keyed by `UserId`, never as
//! counters: `unlike` requires knowing who liked, and the guard against
//! duplicate toggles requires membership. The post-side `bookmarks` set
//! is the single source of truth; the per-user bookmark view is derived
//! by `bookmarks_of`, never stored twice.

use crate::store::SocialStore;
use crate::{EngagementKind, EngagementUpdate, FlockError, PostId, UserId};

/// The EngagementEngine holds no state of its own; it is a pure
/// mutation function over the store seam.
pub struct EngagementEngine;

impl EngagementEngine {
    /// Add the actor to the post's membership set for `kind`.
    ///
    /// Signals `AlreadyInState` if the actor is already a member;
    /// the set is unchanged on conflict.
    pub fn engage<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        post: PostId,
        kind: EngagementKind,
    ) -> Result<EngagementUpdate, FlockError> {
        store
            .get_user(actor)?
            .ok_or(FlockError::UserNotFound(actor))?;
        let mut post_rec = store
            .get_post(post)?
            .ok_or(FlockError::PostNotFound(post))?;

        if !post_rec.engagement_mut(kind).insert(actor) {
            return Err(FlockError::AlreadyInState);
        }
        store.put_post(&post_rec)?;

        Ok(EngagementUpdate {
            actor,
            post,
            kind,
            engaged: true,
            count: post_rec.engagement(kind).len(),
        })
    }

    /// Remove the actor from the post's membership set for `kind`.
    ///
    /// Signals `NotInState` if the actor is not a member.
    pub fn disengage<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        post: PostId,
        kind: EngagementKind,
    ) -> Result<EngagementUpdate, FlockError> {
        store
            .get_user(actor)?
            .ok_or(FlockError::UserNotFound(actor))?;
        let mut post_rec = store
            .get_post(post)?
            .ok_or(FlockError::PostNotFound(post))?;

        if !post_rec.engagement_mut(kind).remove(&actor) {
            return Err(FlockError::NotInState);
        }
        store.put_post(&post_rec)?;

        Ok(EngagementUpdate {
            actor,
            post,
            kind,
            engaged: false,
            count: post_rec.engagement(kind).len(),
        })
    }

    /// Like a post.
    pub fn like<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        post: PostId,
    ) -> Result<EngagementUpdate, FlockError> {
        Self::engage(store, actor, post, EngagementKind::Like)
    }

    /// Withdraw a like.
    pub fn unlike<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        post: PostId,
    ) -> Result<EngagementUpdate, FlockError> {
        Self::disengage(store, actor, post, EngagementKind::Like)
    }

    /// Bookmark a post.
    pub fn bookmark<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        post: PostId,
    ) -> Result<EngagementUpdate, FlockError> {
        Self::engage(store, actor, post, EngagementKind::Bookmark)
    }

    /// Withdraw a bookmark.
    pub fn unbookmark<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        post: PostId,
    ) -> Result<EngagementUpdate, FlockError> {
        Self::disengage(store, actor, post, EngagementKind::Bookmark)
    }

    /// Derived "my bookmarks" view, computed from the canonical
    /// post-side sets. Deterministic post-id order.
    pub fn bookmarks_of<S: SocialStore>(
        store: &S,
        user: UserId,
    ) -> Result<Vec<PostId>, FlockError> {
        store.get_user(user)?.ok_or(FlockError::UserNotFound(user))?;
        Ok(store
            .posts()?
            .into_iter()
            .filter(|p| p.bookmarks.contains(&user))
            .map(|p| p.id)
            .collect())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn seed(store: &mut MemoryStore) -> (UserId, PostId) {
        let user = store
            .insert_user("ada", "ada@example.com", [1u8; 32])
            .expect("insert user");
        let post = store
            .insert_post(user, "first post", vec![])
            .expect("insert post");
        (user, post)
    }

    #[test]
    fn like_adds_membership() {
        let mut store = MemoryStore::new();
        let (user, post) = seed(&mut store);

        let update = EngagementEngine::like(&mut store, user, post).expect("like");
        assert!(update.engaged);
        assert_eq!(update.count, 1);

        let rec = store.get_post(post).expect("get").expect("present");
        assert!(rec.likes.contains(&user));
    }

    #[test]
    fn double_like_signals_conflict() {
        let mut store = MemoryStore::new();
        let (user, post) = seed(&mut store);

        EngagementEngine::like(&mut store, user, post).expect("like");
        let second = EngagementEngine::like(&mut store, user, post);
        assert!(matches!(second, Err(FlockError::AlreadyInState)));

        let rec = store.get_post(post).expect("get").expect("present");
        assert_eq!(rec.likes.len(), 1);
    }

    #[test]
    fn like_unlike_like_cycle_leaves_single_member() {
        let mut store = MemoryStore::new();
        let (user, post) = seed(&mut store);

        EngagementEngine::like(&mut store, user, post).expect("like");
        EngagementEngine::unlike(&mut store, user, post).expect("unlike");
        EngagementEngine::like(&mut store, user, post).expect("like again");

        let rec = store.get_post(post).expect("get").expect("present");
        let members: Vec<_> = rec.likes.iter().copied().collect();
        assert_eq!(members, vec![user]);
    }

    #[test]
    fn unlike_without_like_signals_conflict() {
        let mut store = MemoryStore::new();
        let (user, post) = seed(&mut store);

        let result = EngagementEngine::unlike(&mut store, user, post);
        assert!(matches!(result, Err(FlockError::NotInState)));
    }

    #[test]
    fn like_missing_post_is_not_found() {
        let mut store = MemoryStore::new();
        let (user, _) = seed(&mut store);

        let result = EngagementEngine::like(&mut store, user, PostId(999));
        assert!(matches!(result, Err(FlockError::PostNotFound(PostId(999)))));
    }

    #[test]
    fn like_by_missing_user_is_not_found() {
        let mut store = MemoryStore::new();
        let (_, post) = seed(&mut store);

        let result = EngagementEngine::like(&mut store, UserId(999), post);
        assert!(matches!(result, Err(FlockError::UserNotFound(UserId(999)))));
    }

    #[test]
    fn bookmarks_are_independent_of_likes() {
        let mut store = MemoryStore::new();
        let (user, post) = seed(&mut store);

        EngagementEngine::bookmark(&mut store, user, post).expect("bookmark");
        let rec = store.get_post(post).expect("get").expect("present");
        assert!(rec.bookmarks.contains(&user));
        assert!(rec.likes.is_empty());
    }

    #[test]
    fn bookmarks_of_derives_from_post_side_sets() {
        let mut store = MemoryStore::new();
        let (user, first) = seed(&mut store);
        let second = store
            .insert_post(user, "second post", vec![])
            .expect("insert post");
        let third = store
            .insert_post(user, "third post", vec![])
            .expect("insert post");

        EngagementEngine::bookmark(&mut store, user, third).expect("bookmark");
        EngagementEngine::bookmark(&mut store, user, first).expect("bookmark");

        let view = EngagementEngine::bookmarks_of(&store, user).expect("view");
        assert_eq!(view, vec![first, third]);
        assert!(!view.contains(&second));

        EngagementEngine::unbookmark(&mut store, user, first).expect("unbookmark");
        let view = EngagementEngine::bookmarks_of(&store, user).expect("view");
        assert_eq!(view, vec![third]);
    }
}
