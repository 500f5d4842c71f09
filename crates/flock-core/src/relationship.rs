//! # Relationship Engine
//!
//! Toggles the directed follow edge between two users and keeps both
//! endpoints' set views consistent in one logical operation.
//!
//! All mutations are:
//! - Membership-guarded (duplicate toggles signal a conflict)
//! - Applied as read-modify-write over loaded snapshots
//! - Two-document: actor first, then target. A failure between the two
//!   writes surfaces as `FlockError::PartialWrite` so the caller can
//!   retry; the retry path repairs the mirrored half.

use crate::store::SocialStore;
use crate::{FlockError, RelationUpdate, UserId};

/// The RelationshipEngine holds no state of its own; it is a pure
/// mutation function over the store seam.
pub struct RelationshipEngine;

impl RelationshipEngine {
    /// Create the follow edge `actor -> target`.
    ///
    /// After a successful call:
    /// `target ∈ actor.following ⟺ actor ∈ target.followers`.
    ///
    /// Conflict policy: if the edge already exists on both halves the
    /// call signals `AlreadyInState` and changes nothing. If a previous
    /// partial write left only the actor half, the call repairs the
    /// mirror and succeeds.
    pub fn follow<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        target: UserId,
    ) -> Result<RelationUpdate, FlockError> {
        if actor == target {
            return Err(FlockError::InvalidOperation("cannot follow yourself"));
        }

        let mut actor_rec = store
            .get_user(actor)?
            .ok_or(FlockError::UserNotFound(actor))?;
        let mut target_rec = store
            .get_user(target)?
            .ok_or(FlockError::UserNotFound(target))?;

        let forward = actor_rec.following.contains(&target);
        let mirror = target_rec.followers.contains(&actor);

        if forward && mirror {
            return Err(FlockError::AlreadyInState);
        }

        if !forward {
            actor_rec.following.insert(target);
            store.put_user(&actor_rec)?;
        }

        if !mirror {
            target_rec.followers.insert(actor);
            store.put_user(&target_rec).map_err(|e| {
                FlockError::PartialWrite {
                    completed: "actor.following",
                    failed: e.to_string(),
                }
            })?;
        }

        Ok(RelationUpdate {
            actor,
            target,
            following: true,
            target_followers: target_rec.followers.len(),
            actor_following: actor_rec.following.len(),
        })
    }

    /// Remove the follow edge `actor -> target`.
    ///
    /// Conflict policy mirrors `follow`: `NotInState` only when both
    /// halves are already absent. A stray mirror half left by a prior
    /// partial write is removed and the call succeeds, so a retry after
    /// `PartialWrite` converges instead of conflicting.
    pub fn unfollow<S: SocialStore>(
        store: &mut S,
        actor: UserId,
        target: UserId,
    ) -> Result<RelationUpdate, FlockError> {
        if actor == target {
            return Err(FlockError::InvalidOperation("cannot unfollow yourself"));
        }

        let mut actor_rec = store
            .get_user(actor)?
            .ok_or(FlockError::UserNotFound(actor))?;
        let mut target_rec = store
            .get_user(target)?
            .ok_or(FlockError::UserNotFound(target))?;

        let forward = actor_rec.following.remove(&target);
        let mirror = target_rec.followers.contains(&actor);

        if !forward && !mirror {
            return Err(FlockError::NotInState);
        }

        if forward {
            store.put_user(&actor_rec)?;
        }

        if mirror {
            target_rec.followers.remove(&actor);
            store.put_user(&target_rec).map_err(|e| {
                FlockError::PartialWrite {
                    completed: "actor.following",
                    failed: e.to_string(),
                }
            })?;
        }

        Ok(RelationUpdate {
            actor,
            target,
            following: false,
            target_followers: target_rec.followers.len(),
            actor_following: actor_rec.following.len(),
        })
    }

    /// Whether the edge `actor -> target` exists (authoritative half).
    pub fn is_following<S: SocialStore>(
        store: &S,
        actor: UserId,
        target: UserId,
    ) -> Result<bool, FlockError> {
        let actor_rec = store
            .get_user(actor)?
            .ok_or(FlockError::UserNotFound(actor))?;
        Ok(actor_rec.following.contains(&target))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn two_users(store: &mut MemoryStore) -> (UserId, UserId) {
        let a = store
            .insert_user("ada", "ada@example.com", [1u8; 32])
            .expect("insert");
        let b = store
            .insert_user("bob", "bob@example.com", [2u8; 32])
            .expect("insert");
        (a, b)
    }

    #[test]
    fn follow_updates_both_halves() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        let update = RelationshipEngine::follow(&mut store, a, b).expect("follow");
        assert!(update.following);
        assert_eq!(update.target_followers, 1);

        let a_rec = store.get_user(a).expect("get").expect("present");
        let b_rec = store.get_user(b).expect("get").expect("present");
        assert!(a_rec.following.contains(&b));
        assert!(b_rec.followers.contains(&a));
        // Directed edge: nothing on the reverse direction
        assert!(!a_rec.followers.contains(&b));
        assert!(!b_rec.following.contains(&a));
    }

    #[test]
    fn duplicate_follow_signals_conflict() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        RelationshipEngine::follow(&mut store, a, b).expect("follow");
        let second = RelationshipEngine::follow(&mut store, a, b);
        assert!(matches!(second, Err(FlockError::AlreadyInState)));

        // State unchanged from after the first call
        let b_rec = store.get_user(b).expect("get").expect("present");
        assert_eq!(b_rec.followers.len(), 1);
    }

    #[test]
    fn self_follow_rejected() {
        let mut store = MemoryStore::new();
        let (a, _) = two_users(&mut store);

        let result = RelationshipEngine::follow(&mut store, a, a);
        assert!(matches!(result, Err(FlockError::InvalidOperation(_))));
    }

    #[test]
    fn unfollow_restores_pre_follow_state() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        RelationshipEngine::follow(&mut store, a, b).expect("follow");
        RelationshipEngine::unfollow(&mut store, a, b).expect("unfollow");

        let a_rec = store.get_user(a).expect("get").expect("present");
        let b_rec = store.get_user(b).expect("get").expect("present");
        assert!(a_rec.following.is_empty());
        assert!(b_rec.followers.is_empty());
    }

    #[test]
    fn unfollow_absent_edge_signals_conflict() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        let result = RelationshipEngine::unfollow(&mut store, a, b);
        assert!(matches!(result, Err(FlockError::NotInState)));
    }

    #[test]
    fn follow_missing_target_is_not_found() {
        let mut store = MemoryStore::new();
        let (a, _) = two_users(&mut store);

        let result = RelationshipEngine::follow(&mut store, a, UserId(999));
        assert!(matches!(result, Err(FlockError::UserNotFound(UserId(999)))));

        // No mutation on failure
        let a_rec = store.get_user(a).expect("get").expect("present");
        assert!(a_rec.following.is_empty());
    }

    #[test]
    fn follow_repairs_asymmetric_residue() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        // Simulate a prior partial write: actor half present, mirror absent.
        let mut a_rec = store.get_user(a).expect("get").expect("present");
        a_rec.following.insert(b);
        store.put_user(&a_rec).expect("put");

        let update = RelationshipEngine::follow(&mut store, a, b).expect("repair follow");
        assert!(update.following);

        let b_rec = store.get_user(b).expect("get").expect("present");
        assert!(b_rec.followers.contains(&a));
    }

    #[test]
    fn unfollow_repairs_asymmetric_residue() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        // Simulate a prior partial unfollow: actor half gone, mirror stuck.
        let mut b_rec = store.get_user(b).expect("get").expect("present");
        b_rec.followers.insert(a);
        store.put_user(&b_rec).expect("put");

        let update = RelationshipEngine::unfollow(&mut store, a, b).expect("repair unfollow");
        assert!(!update.following);

        let b_rec = store.get_user(b).expect("get").expect("present");
        assert!(b_rec.followers.is_empty());

        // Both halves gone now, so a further unfollow is a real conflict.
        let again = RelationshipEngine::unfollow(&mut store, a, b);
        assert!(matches!(again, Err(FlockError::NotInState)));
    }

    #[test]
    fn is_following_reflects_edge() {
        let mut store = MemoryStore::new();
        let (a, b) = two_users(&mut store);

        assert!(!RelationshipEngine::is_following(&store, a, b).expect("check"));
        RelationshipEngine::follow(&mut store, a, b).expect("follow");
        assert!(RelationshipEngine::is_following(&store, a, b).expect("check"));
        assert!(!RelationshipEngine::is_following(&store, b, a).expect("check"));
    }
}
