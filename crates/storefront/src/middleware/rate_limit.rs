//! Rate limiting for storefront endpoints.
//!
//! Two limiters live here:
//! - [`FixedWindowLimiter`]: per-client fixed-window counter guarding waitlist
//!   signups (default 5 per minute). Rejections carry the time left in the
//!   window so the response can set `Retry-After`.
//! - [`api_rate_limiter`]: governor token bucket for the cart API (~100/min).
//!
//! Both key on [`client_identifier`]. State is in memory and per process.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderMap, Request, Response};
use axum::response::IntoResponse;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::error::AppError;

/// Identifier used when no proxy header names the client.
///
/// All such clients share one bucket.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Derive the client identifier from proxy headers.
///
/// Uses the first `X-Forwarded-For` entry, then `X-Real-IP`, then
/// [`UNKNOWN_CLIENT`].
#[must_use]
pub fn client_identifier(headers: &HeaderMap) -> String {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return ip.to_owned();
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        return ip.to_owned();
    }

    UNKNOWN_CLIENT.to_owned()
}

// =============================================================================
// Fixed-window limiter
// =============================================================================

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited {
        /// Time until the current window resets.
        retry_after: Duration,
    },
}

impl RateDecision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Whole seconds for a `Retry-After` header, rounded up and at least 1.
#[must_use]
pub fn retry_after_seconds(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    let secs = if retry_after.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    };
    secs.max(1)
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// In-memory per-client limiter with fixed-window counters.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    inner: Arc<FixedWindowInner>,
}

struct FixedWindowInner {
    max_requests: u32,
    window: Duration,
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowLimiter {
    /// Create a limiter allowing `max_requests` per `window` for each client.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(FixedWindowInner {
                max_requests,
                window,
                entries: DashMap::new(),
            }),
        }
    }

    /// Check and count a request from `key` at the current instant.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Check and count a request from `key` at `now`.
    ///
    /// A missing or expired entry starts a fresh window with a count of 1.
    /// Otherwise the request is rejected once the count has reached the
    /// ceiling, and counted when below it.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let fresh = WindowEntry {
            count: 1,
            reset_at: now + self.inner.window,
        };

        match self.inner.entries.entry(key.to_owned()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                RateDecision::Allowed
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.reset_at {
                    *entry = fresh;
                    RateDecision::Allowed
                } else if entry.count >= self.inner.max_requests {
                    RateDecision::Limited {
                        retry_after: entry.reset_at.saturating_duration_since(now),
                    }
                } else {
                    entry.count += 1;
                    RateDecision::Allowed
                }
            }
        }
    }

    /// Remove entries whose window has ended.
    pub fn prune_expired(&self) {
        self.prune_expired_at(Instant::now());
    }

    /// Remove entries whose window ended before `now`.
    pub fn prune_expired_at(&self, now: Instant) {
        self.inner.entries.retain(|_, entry| now <= entry.reset_at);
    }

    /// Number of tracked clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Length of one window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.window
    }
}

// =============================================================================
// Governor limiter for the cart API
// =============================================================================

/// Key extractor backed by [`client_identifier`].
#[derive(Clone, Copy)]
pub struct ClientKeyExtractor;

impl tower_governor::key_extractor::KeyExtractor for ClientKeyExtractor {
    type Key = String;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(client_identifier(req.headers()))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for the cart API: ~100 requests per minute per client.
///
/// Configuration: 1 request per second (replenish), burst of 50.
///
/// # Panics
///
/// This function will not panic. The configuration uses only valid positive
/// integers (`per_second(1)` and `burst_size(50)`), which are always accepted
/// by `GovernorConfigBuilder`.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientKeyExtractor)
        .per_second(1)
        .burst_size(50)
        .finish()
        .expect("rate limiter config with per_second(1) and burst_size(50) is valid");
    GovernorLayer::new(Arc::new(config)).error_handler(governor_error_response)
}

/// Render governor rejections as JSON errors.
fn governor_error_response(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, .. } => {
            AppError::RateLimited(Duration::from_secs(wait_time)).into_response()
        }
        other => AppError::Internal(other.to_string()).into_response(),
    }
}
