//! # Request Throttling
//!
//! One process-wide quota protects the whole API surface. The limit
//! comes from `FLOCK_RATE_LIMIT` (requests per second, default 100);
//! `0` disables throttling and the layer is not installed at all.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

use super::types::ErrorResponse;

/// Applied when `FLOCK_RATE_LIMIT` is unset or unparseable.
const DEFAULT_RATE_LIMIT: u32 = 100;

// =============================================================================
// THROTTLE
// =============================================================================

/// Shared throttle state: the quota plus the configured limit, kept
/// alongside it so the 429 body can name the rate it enforces.
#[derive(Clone)]
pub struct Throttle {
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    requests_per_second: NonZeroU32,
}

impl Throttle {
    /// Build a throttle admitting `requests_per_second` requests.
    #[must_use]
    pub fn new(requests_per_second: NonZeroU32) -> Self {
        let quota = Quota::per_second(requests_per_second);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            requests_per_second,
        }
    }

    /// Build from `FLOCK_RATE_LIMIT`. Returns `None` when the variable
    /// is set to `0`, meaning throttling is disabled.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        parse_rate_limit(std::env::var("FLOCK_RATE_LIMIT").ok()).map(Self::new)
    }

    /// The configured admission rate.
    #[must_use]
    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second.get()
    }

    /// Whether the current request fits the quota.
    fn admit(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

fn parse_rate_limit(raw: Option<String>) -> Option<NonZeroU32> {
    let rps = raw
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT);
    NonZeroU32::new(rps)
}

/// Throttling middleware.
///
/// Rejects with 429 and a JSON error body naming the configured limit
/// once the shared quota is exhausted.
pub async fn throttle_middleware(
    State(throttle): State<Throttle>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    if throttle.admit() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(limit = throttle.requests_per_second(), "Request throttled");
        Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new(format!(
                "Rate limit exceeded ({} requests/second)",
                throttle.requests_per_second()
            ))),
        ))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exhaustion_rejects_the_next_request() {
        // A 1 rps quota has a burst capacity of exactly one request.
        let throttle = Throttle::new(NonZeroU32::MIN);
        assert!(throttle.admit());
        assert!(!throttle.admit());
    }

    #[test]
    fn zero_disables_throttling() {
        assert!(parse_rate_limit(Some("0".to_string())).is_none());
    }

    #[test]
    fn unset_and_garbage_fall_back_to_the_default() {
        assert_eq!(parse_rate_limit(None).map(NonZeroU32::get), Some(100));
        assert_eq!(
            parse_rate_limit(Some("plenty".to_string())).map(NonZeroU32::get),
            Some(100)
        );
    }
}
