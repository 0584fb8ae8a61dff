//! Waitlist signup types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use soirn_core::{Email, SignupId};

/// Source recorded when the caller does not name one.
pub const DEFAULT_SOURCE: &str = "site";

/// Maximum stored length of a signup source, in characters.
pub const MAX_SOURCE_LEN: usize = 64;

/// A validated signup ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignup {
    pub email: Email,
    pub source: String,
}

impl NewSignup {
    /// Build a signup, normalizing the source tag.
    ///
    /// A missing or blank source becomes [`DEFAULT_SOURCE`]; anything else is
    /// trimmed and cut to [`MAX_SOURCE_LEN`] characters.
    #[must_use]
    pub fn new(email: Email, source: Option<&str>) -> Self {
        let source = source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(
                || DEFAULT_SOURCE.to_string(),
                |s| s.chars().take(MAX_SOURCE_LEN).collect(),
            );
        Self { email, source }
    }
}

/// A stored waitlist signup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistSignup {
    pub id: SignupId,
    pub email: Email,
    pub source: String,
    pub created_at: DateTime<Utc>,
}
