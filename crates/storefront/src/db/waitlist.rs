//! Waitlist repository for database operations.
//!
//! Queries are checked at runtime; the unique index on `email` is what makes
//! repeated signups idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use soirn_core::{Email, SignupId};

use super::{RepositoryError, SignupStore};
use crate::models::signup::{NewSignup, WaitlistSignup};

/// Internal row type for `PostgreSQL` waitlist queries.
#[derive(Debug, sqlx::FromRow)]
struct WaitlistSignupRow {
    id: i32,
    email: String,
    source: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<WaitlistSignupRow> for WaitlistSignup {
    type Error = RepositoryError;

    fn try_from(row: WaitlistSignupRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: SignupId::new(row.id),
            email,
            source: row.source,
            created_at: row.created_at,
        })
    }
}

/// Repository for waitlist signups.
#[derive(Clone)]
pub struct WaitlistRepository {
    pool: PgPool,
}

impl WaitlistRepository {
    /// Create a new waitlist repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SignupStore for WaitlistRepository {
    /// Insert a signup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    async fn insert(&self, signup: &NewSignup) -> Result<WaitlistSignup, RepositoryError> {
        let row = sqlx::query_as::<_, WaitlistSignupRow>(
            r"
            INSERT INTO waitlist_signups (email, source)
            VALUES ($1, $2)
            RETURNING id, email, source, created_at
            ",
        )
        .bind(signup.email.as_str())
        .bind(&signup.source)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
