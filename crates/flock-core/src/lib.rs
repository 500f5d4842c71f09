//! # flock-core
//!
//! The deterministic social-graph engine for Flock - THE LOGIC.
//!
//! This crate implements the two engines at the heart of the system:
//! the Relationship Engine (follow/unfollow over a symmetric
//! follower/following edge set) and the Engagement Engine (like and
//! bookmark membership sets between users and posts), plus the store
//! seam they mutate through.
//!
//! ## Architectural Constraints
//!
//! - Every relation is a membership set, never a counter
//! - Every mutation is a guarded read-modify-write: duplicate toggles
//!   signal a conflict instead of corrupting the set
//! - The engines hold no state; the store exclusively owns records
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

#[cfg(feature = "crypto-hash")]
pub mod credentials;
pub mod engagement;
pub mod network;
pub mod primitives;
pub mod relationship;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Comment, CredentialDigest, EngagementKind, EngagementUpdate, FlockError, Post, PostId,
    RelationUpdate, User, UserId,
};

// =============================================================================
// RE-EXPORTS: Engines & Store
// =============================================================================

pub use engagement::EngagementEngine;
pub use network::{Network, StorageBackend};
pub use relationship::RelationshipEngine;
pub use storage::RedbStore;
pub use store::{MemoryStore, SocialStore};
