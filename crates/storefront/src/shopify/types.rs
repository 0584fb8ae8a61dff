//! Checkout types exchanged with the commerce platform.

use serde::{Deserialize, Serialize};

/// One line of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLineInput {
    /// Platform variant ID (e.g., `gid://shopify/ProductVariant/123`).
    pub variant_id: String,
    pub quantity: u32,
}

/// A hosted checkout session. The visitor is redirected to `checkout_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub checkout_id: String,
    pub checkout_url: String,
}
