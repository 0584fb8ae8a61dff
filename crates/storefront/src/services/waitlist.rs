//! Waitlist signup gateway.
//!
//! A submission is processed strictly in this order: rate limit, lenient body
//! parse, email normalization and validation, insert. A rate-limited request
//! never reaches the parser or the store.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use soirn_core::{Email, EmailError};

use crate::db::{RepositoryError, SignupStore};
use crate::error::add_breadcrumb;
use crate::middleware::rate_limit::{FixedWindowLimiter, RateDecision};
use crate::models::signup::NewSignup;

/// Errors returned by [`SignupGateway::submit`].
#[derive(Debug, Error)]
pub enum SignupError {
    /// The client exceeded its signup allowance for the current window.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    /// The submitted email is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The signup store failed.
    #[error("waitlist store error: {0}")]
    Store(#[source] RepositoryError),
}

impl From<EmailError> for SignupError {
    fn from(err: EmailError) -> Self {
        let message = match err {
            EmailError::Empty => "Email required",
            _ => "Invalid email",
        };
        Self::Validation(message.to_string())
    }
}

/// Result of an accepted signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupOutcome {
    /// A new signup was stored.
    Joined,
    /// The email was already on the list.
    AlreadyJoined,
}

impl SignupOutcome {
    #[must_use]
    pub const fn already(self) -> bool {
        matches!(self, Self::AlreadyJoined)
    }
}

/// Fields pulled out of a signup body.
///
/// Parsing never fails: anything that is not a JSON object yields no fields,
/// and non-string values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub source: Option<String>,
}

impl SignupRequest {
    #[must_use]
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };

        let string_field = |name: &str| {
            fields
                .get(name)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        };

        Self {
            email: string_field("email"),
            source: string_field("source"),
        }
    }
}

/// Accepts waitlist signups.
#[derive(Clone)]
pub struct SignupGateway {
    store: Arc<dyn SignupStore>,
    limiter: FixedWindowLimiter,
}

impl SignupGateway {
    #[must_use]
    pub fn new(store: Arc<dyn SignupStore>, limiter: FixedWindowLimiter) -> Self {
        Self { store, limiter }
    }

    /// The limiter guarding submissions.
    #[must_use]
    pub const fn limiter(&self) -> &FixedWindowLimiter {
        &self.limiter
    }

    /// Process a raw submission from `client_key`.
    ///
    /// # Errors
    ///
    /// - `SignupError::RateLimited` if the client is over its allowance
    /// - `SignupError::Validation` with `"Email required"` or `"Invalid email"`
    /// - `SignupError::Store` if the insert failed for any reason other than
    ///   the email already being registered
    #[instrument(skip(self, body), fields(client = %client_key))]
    pub async fn submit(&self, client_key: &str, body: &[u8]) -> Result<SignupOutcome, SignupError> {
        if let RateDecision::Limited { retry_after } = self.limiter.check(client_key) {
            tracing::warn!(retry_after_ms = retry_after.as_millis(), "Waitlist signup rate limited");
            return Err(SignupError::RateLimited { retry_after });
        }

        let request = SignupRequest::from_body(body);
        self.register(request).await
    }

    /// Validate and store an already-parsed request, skipping the rate limit.
    ///
    /// # Errors
    ///
    /// Same as [`SignupGateway::submit`], minus `RateLimited`.
    pub async fn register(&self, request: SignupRequest) -> Result<SignupOutcome, SignupError> {
        let email = Email::normalize(request.email.as_deref().unwrap_or_default())?;
        let signup = NewSignup::new(email, request.source.as_deref());

        match self.store.insert(&signup).await {
            Ok(stored) => {
                tracing::info!(
                    signup_id = %stored.id,
                    domain = %stored.email.domain(),
                    source = %stored.source,
                    "Waitlist signup stored"
                );
                add_breadcrumb("waitlist", "Joined waitlist", Some(&[("source", stored.source.as_str())]));
                Ok(SignupOutcome::Joined)
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(source = %signup.source, "Waitlist signup already registered");
                Ok(SignupOutcome::AlreadyJoined)
            }
            Err(err) => Err(SignupError::Store(err)),
        }
    }
}
