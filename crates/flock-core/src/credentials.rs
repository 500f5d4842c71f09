//! # Credential Digests
//!
//! Keyed BLAKE3 digests for stored login credentials.
//!
//! Only available with the `crypto-hash` feature (enabled by default).
//! The stored record never contains the plaintext credential; the
//! digest is keyed by a domain-separated derivation of the email so
//! identical passwords under different accounts produce different
//! digests.

use crate::CredentialDigest;
use crate::types::FlockError;

/// Domain separation context for credential keys.
const CREDENTIAL_CONTEXT: &str = "flock.credentials.v1";

/// Compute the stored digest for an email/password pair.
#[must_use]
pub fn digest_credentials(email: &str, password: &str) -> CredentialDigest {
    let key = blake3::derive_key(CREDENTIAL_CONTEXT, email.as_bytes());
    *blake3::keyed_hash(&key, password.as_bytes()).as_bytes()
}

/// Verify a presented password against a stored digest.
///
/// The comparison runs over the full 32-byte digest regardless of
/// where the first mismatch occurs.
pub fn verify_credentials(
    email: &str,
    password: &str,
    stored: &CredentialDigest,
) -> Result<(), FlockError> {
    let presented = digest_credentials(email, password);
    let mut diff = 0u8;
    for (a, b) in presented.iter().zip(stored.iter()) {
        diff |= a ^ b;
    }
    if diff == 0 {
        Ok(())
    } else {
        Err(FlockError::InvalidCredentials)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_roundtrip_verifies() {
        let digest = digest_credentials("ada@example.com", "hunter2");
        assert!(verify_credentials("ada@example.com", "hunter2", &digest).is_ok());
    }

    #[test]
    fn wrong_password_rejected() {
        let digest = digest_credentials("ada@example.com", "hunter2");
        let result = verify_credentials("ada@example.com", "hunter3", &digest);
        assert!(matches!(result, Err(FlockError::InvalidCredentials)));
    }

    #[test]
    fn same_password_different_email_differs() {
        let a = digest_credentials("ada@example.com", "hunter2");
        let b = digest_credentials("bob@example.com", "hunter2");
        assert_ne!(a, b);
    }
}
