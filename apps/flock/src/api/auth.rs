//! # Authentication Module
//!
//! Bearer-token authentication for the Flock HTTP API.
//!
//! Tokens are minted at `/login` and carry `user_id` and an expiry
//! timestamp, authenticated by a keyed BLAKE3 MAC. The key is derived
//! from the configured secret; configuration is an explicit
//! [`AuthConfig`] passed into router construction, never module-level
//! mutable state.
//!
//! ## Usage
//!
//! Send the token in the Authorization header:
//! ```text
//! Authorization: Bearer <token>
//! ```

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flock_core::UserId;
use flock_core::primitives::DEFAULT_TOKEN_TTL_SECS;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// Domain separation context for token MAC keys.
const TOKEN_CONTEXT: &str = "flock.token.v1";

/// Fallback secret used only when no secret is configured.
/// `cmd_server` logs a loud warning when this is in effect.
const DEV_SECRET: &str = "flock-dev-secret";

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Token issuing/verification configuration.
///
/// Recognized options: the signing secret and the token lifetime.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    token_secret: String,
    token_ttl: Duration,
}

impl AuthConfig {
    /// Create a config from explicit values.
    #[must_use]
    pub fn new(token_secret: impl Into<String>, token_ttl: Duration) -> Self {
        Self {
            token_secret: token_secret.into(),
            token_ttl,
        }
    }

    /// Build a config from `FLOCK_TOKEN_SECRET` / `FLOCK_TOKEN_TTL_SECS`.
    ///
    /// Falls back to a development secret when no secret is set; the
    /// caller is expected to warn loudly in that case (see
    /// `is_dev_secret`).
    #[must_use]
    pub fn from_env() -> Self {
        let token_secret = std::env::var("FLOCK_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEV_SECRET.to_string());
        let ttl_secs = std::env::var("FLOCK_TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        Self::new(token_secret, Duration::from_secs(ttl_secs))
    }

    /// Like `from_env`, but with an explicit token lifetime.
    #[must_use]
    pub fn from_env_with_ttl(token_ttl: Duration) -> Self {
        Self {
            token_ttl,
            ..Self::from_env()
        }
    }

    /// Whether this config is running on the built-in development secret.
    #[must_use]
    pub fn is_dev_secret(&self) -> bool {
        self.token_secret == DEV_SECRET
    }

    /// The configured token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    fn mac_key(&self) -> [u8; 32] {
        blake3::derive_key(TOKEN_CONTEXT, self.token_secret.as_bytes())
    }

    /// Mint a token for an authenticated user.
    ///
    /// Format: `base64url(user_id:expiry) "." base64url(mac)`.
    #[must_use]
    pub fn issue_token(&self, user: UserId, now: SystemTime) -> IssuedToken {
        let now_secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        let expires_at = now_secs.saturating_add(self.token_ttl.as_secs());
        let payload = format!("{}:{}", user.0, expires_at);
        let mac = blake3::keyed_hash(&self.mac_key(), payload.as_bytes());

        let token = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(mac.as_bytes())
        );
        IssuedToken { token, expires_at }
    }

    /// Verify a presented token and extract the caller identity.
    ///
    /// The MAC comparison is constant-time over the full 32 bytes.
    pub fn verify_token(&self, token: &str, now: SystemTime) -> Result<UserId, &'static str> {
        let (payload_b64, mac_b64) = token.split_once('.').ok_or("malformed token")?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| "malformed token")?;
        let presented_mac = URL_SAFE_NO_PAD
            .decode(mac_b64)
            .map_err(|_| "malformed token")?;
        if presented_mac.len() != 32 {
            return Err("malformed token");
        }

        let expected_mac = blake3::keyed_hash(&self.mac_key(), &payload);
        let mac_ok: bool = presented_mac
            .as_slice()
            .ct_eq(expected_mac.as_bytes())
            .into();
        if !mac_ok {
            return Err("invalid signature");
        }

        let payload = String::from_utf8(payload).map_err(|_| "malformed token")?;
        let (user_part, expiry_part) = payload.split_once(':').ok_or("malformed token")?;
        let user_id: u64 = user_part.parse().map_err(|_| "malformed token")?;
        let expires_at: u64 = expiry_part.parse().map_err(|_| "malformed token")?;

        let now_secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs();
        if now_secs >= expires_at {
            return Err("token expired");
        }

        Ok(UserId(user_id))
    }
}

/// A freshly minted token and its expiry timestamp (Unix seconds).
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: u64,
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

/// The authenticated caller, inserted into request extensions by
/// [`require_auth`] and consumed by protected handlers.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser(pub UserId);

/// Bearer-token authentication middleware for protected routes.
///
/// Verifies the Authorization header and injects [`AuthedUser`];
/// rejects with 401 otherwise.
pub async fn require_auth(
    State(auth): State<AuthConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let Some(header_value) = auth_header else {
        tracing::warn!(
            event = "auth_failure",
            reason = "missing_authorization_header",
            "Missing Authorization header"
        );
        return Err((StatusCode::UNAUTHORIZED, "No token provided"));
    };

    // Support both "Bearer <token>" and raw "<token>" formats
    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    match auth.verify_token(token, SystemTime::now()) {
        Ok(user) => {
            request.extensions_mut().insert(AuthedUser(user));
            Ok(next.run(request).await)
        }
        Err(reason) => {
            tracing::warn!(event = "auth_failure", reason, "Authentication failed");
            Err((StatusCode::UNAUTHORIZED, "Invalid token"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new("unit-test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_verifies() {
        let auth = config();
        let now = SystemTime::now();
        let issued = auth.issue_token(UserId(42), now);

        let user = auth.verify_token(&issued.token, now).expect("verify");
        assert_eq!(user, UserId(42));
    }

    #[test]
    fn expired_token_rejected() {
        let auth = config();
        let now = SystemTime::now();
        let issued = auth.issue_token(UserId(42), now);

        let later = now + Duration::from_secs(3601);
        assert_eq!(auth.verify_token(&issued.token, later), Err("token expired"));
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let now = SystemTime::now();
        let issued = config().issue_token(UserId(42), now);

        let other = AuthConfig::new("different-secret", Duration::from_secs(3600));
        assert_eq!(
            other.verify_token(&issued.token, now),
            Err("invalid signature")
        );
    }

    #[test]
    fn tampered_payload_rejected() {
        let auth = config();
        let now = SystemTime::now();
        let issued = auth.issue_token(UserId(42), now);

        // Swap the payload for a different user id, keep the MAC.
        let (_, mac) = issued.token.split_once('.').expect("two parts");
        let forged = format!("{}.{}", URL_SAFE_NO_PAD.encode(b"7:9999999999"), mac);
        assert_eq!(auth.verify_token(&forged, now), Err("invalid signature"));
    }

    #[test]
    fn garbage_token_rejected() {
        let auth = config();
        let now = SystemTime::now();
        assert!(auth.verify_token("not-a-token", now).is_err());
        assert!(auth.verify_token("a.b", now).is_err());
        assert!(auth.verify_token("", now).is_err());
    }
}
