//! Domain models for storefront.

pub mod signup;

/// Session keys for visitor state.
pub mod keys {
    /// Durable cart slot. Holds the serialized line items.
    pub const CART: &str = soirn_core::cart::CART_STORAGE_KEY;

    /// Cart drawer visibility. Not part of the durable slot.
    pub const CART_OPEN: &str = "soirn_cart_open";
}
