//! Shopify Storefront API client and the checkout port.
//!
//! # Architecture
//!
//! - Shopify owns checkout and payment; the storefront only creates a hosted
//!   checkout session and hands back its URL
//! - Requests are plain `reqwest` posts carrying `graphql_client` bodies
//! - No retries; a failed checkout is surfaced to the visitor, who may retry
//!
//! # Example
//!
//! ```rust,ignore
//! use soirn_storefront::shopify::{CheckoutLineInput, CheckoutPlatform, StorefrontClient};
//!
//! let client = StorefrontClient::new(&config.shopify);
//! let session = client
//!     .create_checkout(&[CheckoutLineInput {
//!         variant_id: "gid://shopify/ProductVariant/123".to_string(),
//!         quantity: 1,
//!     }])
//!     .await?;
//! ```

mod storefront;
pub mod types;

pub use storefront::StorefrontClient;
pub use storefront::queries;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Commerce platform that owns hosted checkout.
#[async_trait]
pub trait CheckoutPlatform: Send + Sync {
    /// Create a hosted checkout session for the given lines.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::UserError` when the platform rejects the input,
    /// and any other variant when the request itself failed.
    async fn create_checkout(
        &self,
        lines: &[CheckoutLineInput],
    ) -> Result<CheckoutSession, ShopifyError>;
}

/// Errors from the Storefront API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status other than 429.
    #[error("Shopify returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Top-level GraphQL errors, one entry per error.
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response carried neither data nor errors.
    #[error("Shopify response has no data")]
    NoData,

    /// Expected data was missing from a successful response.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Input rejected by a mutation (`userErrors`).
    #[error("User error: {0}")]
    UserError(String),
}

/// Describe a GraphQL error as `message (at a.b.0)`.
pub(crate) fn describe_graphql_error(error: &graphql_client::Error) -> String {
    let path = error.path.as_deref().map(|fragments| {
        fragments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    });

    match path {
        Some(path) if !path.is_empty() => format!("{} (at {path})", error.message),
        _ => error.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use graphql_client::PathFragment;

    use super::*;

    fn graphql_error(message: &str, path: Option<Vec<PathFragment>>) -> graphql_client::Error {
        graphql_client::Error {
            message: message.to_string(),
            locations: None,
            path,
            extensions: None,
        }
    }

    #[test]
    fn test_user_error_display() {
        let err = ShopifyError::UserError("Variant is sold out".to_string());
        assert_eq!(err.to_string(), "User error: Variant is sold out");
    }

    #[test]
    fn test_graphql_errors_are_joined() {
        let err = ShopifyError::GraphQL(vec![
            "Field not found".to_string(),
            "Invalid ID".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_describe_graphql_error_with_path() {
        let error = graphql_error(
            "Throttled",
            Some(vec![
                PathFragment::Key("cartCreate".to_string()),
                PathFragment::Index(0),
            ]),
        );
        assert_eq!(describe_graphql_error(&error), "Throttled (at cartCreate.0)");
        assert_eq!(
            describe_graphql_error(&graphql_error("Throttled", None)),
            "Throttled"
        );
    }
}
