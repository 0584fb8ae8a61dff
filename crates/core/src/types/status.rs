//! Status enums for catalog entities.

use serde::{Deserialize, Serialize};

/// Availability of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    InStock,
    SoldOut,
    ComingSoon,
}

impl ProductStatus {
    /// Label shown next to the product.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::SoldOut => "Sold out",
            Self::ComingSoon => "Coming soon",
        }
    }

    /// Whether the product can be added to a cart.
    #[must_use]
    pub const fn is_purchasable(&self) -> bool {
        matches!(self, Self::InStock)
    }
}
