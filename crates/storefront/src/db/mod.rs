//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `soirn_storefront`
//!
//! Stores local data only (Shopify is source of truth for products/orders):
//!
//! ## Tables
//!
//! - `waitlist_signups` - Launch waitlist, unique per email
//! - `tower_sessions.session` - Tower-sessions storage (session cart)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p soirn-cli -- migrate
//! ```

pub mod waitlist;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crate::models::signup::{NewSignup, WaitlistSignup};

pub use waitlist::WaitlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence port for waitlist signups.
///
/// Implementations must report a duplicate email as
/// [`RepositoryError::Conflict`]; the signup gateway treats that as success.
#[async_trait]
pub trait SignupStore: Send + Sync {
    /// Insert a signup.
    async fn insert(&self, signup: &NewSignup) -> Result<WaitlistSignup, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
