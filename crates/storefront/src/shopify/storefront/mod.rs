//! Shopify Storefront API client implementation.
//!
//! Uses `graphql_client` request/response envelopes with `reqwest` 0.13 for HTTP.

pub mod queries;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphql_client::{GraphQLQuery, Response};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use crate::config::ShopifyStorefrontConfig;
use crate::shopify::types::{CheckoutLineInput, CheckoutSession};
use crate::shopify::{CheckoutPlatform, ShopifyError, describe_graphql_error};

use queries::{CreateCheckoutCart, create_checkout_cart};

/// Header carrying a public Storefront API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Storefront-Access-Token";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// StorefrontClient
// =============================================================================

/// Client for the Shopify Storefront API.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<StorefrontClientInner>,
}

struct StorefrontClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyStorefrontConfig) -> Result<Self, ShopifyError> {
        Self::with_endpoint(config.endpoint(), config.access_token.clone())
    }

    /// Create a client against an explicit GraphQL endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn with_endpoint(
        endpoint: String,
        access_token: SecretString,
    ) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(StorefrontClientInner {
                client,
                endpoint,
                access_token,
            }),
        })
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Execute a GraphQL operation.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, ShopifyError> {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header(ACCESS_TOKEN_HEADER, self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&response_text, 500),
                "Shopify API returned non-success status"
            );
            return Err(ShopifyError::Status {
                status: status.as_u16(),
                body: truncate(&response_text, 200),
            });
        }

        let response: Response<Q::ResponseData> = serde_json::from_str(&response_text)
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    body = %truncate(&response_text, 500),
                    "Failed to parse Shopify GraphQL response"
                );
            })?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");
            return Err(ShopifyError::GraphQL(
                errors.iter().map(describe_graphql_error).collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %truncate(&response_text, 500),
                "Shopify GraphQL response has no data and no errors"
            );
            ShopifyError::NoData
        })
    }
}

#[async_trait]
impl CheckoutPlatform for StorefrontClient {
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    async fn create_checkout(
        &self,
        lines: &[CheckoutLineInput],
    ) -> Result<CheckoutSession, ShopifyError> {
        if lines.is_empty() {
            return Err(ShopifyError::UserError("Line items are required".to_string()));
        }

        let variables = create_checkout_cart::Variables {
            lines: lines
                .iter()
                .map(|line| create_checkout_cart::CartLineInput {
                    merchandise_id: line.variant_id.clone(),
                    quantity: Some(i64::from(line.quantity)),
                })
                .collect(),
        };

        let data = self.execute::<CreateCheckoutCart>(variables).await?;
        let session = session_from_response(data)?;
        tracing::info!(checkout_id = %session.checkout_id, "Created hosted checkout");
        Ok(session)
    }
}

/// Map a `cartCreate` payload to a checkout session.
///
/// The first user error wins; a payload with neither errors nor a cart is
/// treated as a failed request.
fn session_from_response(
    data: create_checkout_cart::ResponseData,
) -> Result<CheckoutSession, ShopifyError> {
    let payload = data
        .cart_create
        .ok_or_else(|| ShopifyError::NotFound("cartCreate payload".to_string()))?;

    if let Some(user_error) = payload.user_errors.into_iter().next() {
        tracing::warn!(
            code = ?user_error.code,
            field = ?user_error.field,
            message = %user_error.message,
            "Checkout rejected by Shopify"
        );
        return Err(ShopifyError::UserError(user_error.message));
    }

    let cart = payload
        .cart
        .ok_or_else(|| ShopifyError::NotFound("checkout cart".to_string()))?;

    Ok(CheckoutSession {
        checkout_id: cart.id,
        checkout_url: cart.checkout_url,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn response(raw: &str) -> create_checkout_cart::ResponseData {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_session_from_response() {
        let data = response(
            r#"{"cartCreate": {"cart": {"id": "gid://shopify/Cart/abc", "checkoutUrl": "https://soirn.myshopify.com/cart/c/abc"}, "userErrors": []}}"#,
        );
        let session = session_from_response(data).unwrap();
        assert_eq!(session.checkout_id, "gid://shopify/Cart/abc");
        assert_eq!(session.checkout_url, "https://soirn.myshopify.com/cart/c/abc");
    }

    #[test]
    fn test_first_user_error_wins() {
        let data = response(
            r#"{"cartCreate": {"cart": null, "userErrors": [
                {"code": null, "field": null, "message": "Variant is sold out"},
                {"code": null, "field": null, "message": "Second"}
            ]}}"#,
        );
        let err = session_from_response(data).unwrap_err();
        assert!(matches!(err, ShopifyError::UserError(msg) if msg == "Variant is sold out"));
    }

    #[test]
    fn test_missing_cart_is_not_a_user_error() {
        let data = response(r#"{"cartCreate": {"cart": null, "userErrors": []}}"#);
        assert!(matches!(
            session_from_response(data),
            Err(ShopifyError::NotFound(_))
        ));

        let data = response(r#"{"cartCreate": null}"#);
        assert!(matches!(
            session_from_response(data),
            Err(ShopifyError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_lines_rejected_without_request() {
        let client = StorefrontClient::with_endpoint(
            "http://127.0.0.1:9/graphql.json".to_string(),
            SecretString::from("token"),
        )
        .unwrap();

        let err = client.create_checkout(&[]).await.unwrap_err();
        assert!(matches!(err, ShopifyError::UserError(msg) if msg == "Line items are required"));
    }
}
