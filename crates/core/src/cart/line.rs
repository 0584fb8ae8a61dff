//! Cart line items.

use serde::{Deserialize, Serialize};

/// One row of the cart: a distinct product + variant and its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Slug of the parent product.
    pub product_key: String,
    /// Variant label (e.g. size).
    pub variant_key: String,
    /// Name shown in the cart.
    #[serde(default)]
    pub display_name: String,
    /// Unit price in minor currency units.
    pub unit_price_minor_units: u64,
    /// Image shown in the cart.
    #[serde(default)]
    pub image_ref: String,
    /// Always at least 1 inside a cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// Whether this line is the given (product, variant) pair.
    #[must_use]
    pub fn matches(&self, product_key: &str, variant_key: &str) -> bool {
        self.product_key == product_key && self.variant_key == variant_key
    }

    /// `unit_price * quantity`, saturating.
    #[must_use]
    pub fn line_total(&self) -> u64 {
        self.unit_price_minor_units
            .saturating_mul(u64::from(self.quantity))
    }
}

/// Item data supplied when adding to the cart (everything but the quantity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemInput {
    pub product_key: String,
    pub variant_key: String,
    pub display_name: String,
    pub unit_price_minor_units: u64,
    #[serde(default)]
    pub image_ref: String,
}

impl CartItemInput {
    /// Turn the input into a line with the given quantity.
    #[must_use]
    pub fn into_line(self, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_key: self.product_key,
            variant_key: self.variant_key,
            display_name: self.display_name,
            unit_price_minor_units: self.unit_price_minor_units,
            image_ref: self.image_ref,
            quantity,
        }
    }
}
