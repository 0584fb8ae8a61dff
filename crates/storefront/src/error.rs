//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Responses are JSON: `{"error": "<message>"}`.

use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::db::RepositoryError;
use crate::middleware::rate_limit::retry_after_seconds;
use crate::services::waitlist::SignupError;
use crate::shopify::ShopifyError;

/// Generic message for a failed checkout.
pub const CHECKOUT_FAILED: &str = "Failed to create checkout";

/// Generic message for a failed waitlist insert.
pub const WAITLIST_FAILED: &str = "Failed to join waitlist. Try again.";

/// Message for a rate-limited signup.
pub const RATE_LIMITED: &str = "Too many requests. Try again soon.";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Waitlist signup failed.
    #[error("Signup error: {0}")]
    Signup(#[from] SignupError),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Per-client request limit hit outside the signup gateway.
    #[error("Rate limited, retry after {0:?}")]
    RateLimited(Duration),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Shopify(ShopifyError::UserError(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Shopify(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Signup(SignupError::RateLimited { .. }) | Self::RateLimited(_) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            Self::Signup(SignupError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Signup(SignupError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Catalog(err) => {
                if err.is_client_error() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message safe to show the client.
    ///
    /// Server-side failures never expose internal error details.
    fn client_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Shopify(ShopifyError::UserError(message)) => message.clone(),
            Self::Shopify(_) => CHECKOUT_FAILED.to_string(),
            Self::Signup(SignupError::RateLimited { .. }) | Self::RateLimited(_) => {
                RATE_LIMITED.to_string()
            }
            Self::Signup(SignupError::Validation(message)) => message.clone(),
            Self::Signup(SignupError::Store(_)) => WAITLIST_FAILED.to_string(),
            Self::Catalog(err) if err.is_client_error() => err.to_string(),
            Self::Catalog(_) => "Internal server error".to_string(),
            Self::NotFound(_) | Self::BadRequest(_) => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let mut response = (status, Json(json!({ "error": self.client_message() }))).into_response();

        if let Self::Signup(SignupError::RateLimited { retry_after }) | Self::RateLimited(retry_after) =
            &self
            && let Ok(value) = HeaderValue::from_str(&retry_after_seconds(*retry_after).to_string())
        {
            response.headers_mut().insert(RETRY_AFTER, value);
        }

        response
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for visitor actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product", "drop-001-hoodie-black")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
