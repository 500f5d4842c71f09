//! # Innate Primitives
//!
//! Hardcoded runtime constants for the Flock core.
//!
//! These limits are compiled into the binary and are immutable at
//! runtime. They bound every input field before it reaches a store.

/// Maximum length for a user name, in bytes.
pub const MAX_USER_NAME_LENGTH: usize = 64;

/// Maximum length for an email address, in bytes.
pub const MAX_EMAIL_LENGTH: usize = 256;

/// Maximum length for a post body, in bytes.
///
/// Matches the schema limit the stored content has always carried.
pub const MAX_CONTENT_LENGTH: usize = 1000;

/// Maximum length for a single comment, in bytes.
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Maximum number of media references attached to one post.
pub const MAX_MEDIA_ITEMS: usize = 16;

/// Maximum length of a single media reference, in bytes.
pub const MAX_MEDIA_REF_LENGTH: usize = 2048;

/// Default bearer-token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
