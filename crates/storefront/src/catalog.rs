//! Static product catalog.
//!
//! The catalog is a read-only lookup table loaded once at startup from a JSON
//! file. It maps cart lines to Shopify variant IDs and backs the product
//! listing endpoints.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use soirn_core::cart::CartLineItem;
use soirn_core::{CurrencyCode, Price, ProductStatus};

use crate::shopify::CheckoutLineInput;

/// Errors raised while loading the catalog or resolving cart lines.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A cart line names a product that is not in the catalog.
    #[error("Product not found: {0}")]
    UnknownProduct(String),

    /// The product has no platform variant for the requested size.
    #[error("Variant ID not found for {name} - {size}")]
    UnknownVariant { name: String, size: String },

    /// The catalog file could not be read.
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not valid JSON for the expected shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// The catalog parsed but is inconsistent.
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

impl CatalogError {
    /// Whether this error was caused by the request rather than the catalog.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::UnknownProduct(_) | Self::UnknownVariant { .. })
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub slug: String,
    pub name: String,
    /// Price in minor units.
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<u64>,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Bullet lines.
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Size label to platform variant ID.
    #[serde(default)]
    pub shopify_variants: BTreeMap<String, String>,
}

impl CatalogProduct {
    #[must_use]
    pub const fn price(&self) -> Price {
        Price::new(self.price, self.currency)
    }

    #[must_use]
    pub fn compare_at_price(&self) -> Option<Price> {
        self.compare_at_price
            .map(|minor_units| Price::new(minor_units, self.currency))
    }

    /// Platform variant ID for a size, if the product sells that size.
    #[must_use]
    pub fn variant_id(&self, size: &str) -> Option<&str> {
        self.shopify_variants.get(size).map(String::as_str)
    }
}

/// Status filter for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    InStock,
    ComingSoon,
    SoldOut,
}

impl StatusFilter {
    const fn matches(self, status: ProductStatus) -> bool {
        match self {
            Self::All => true,
            Self::InStock => matches!(status, ProductStatus::InStock),
            Self::ComingSoon => matches!(status, ProductStatus::ComingSoon),
            Self::SoldOut => matches!(status, ProductStatus::SoldOut),
        }
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Default,
    PriceLow,
    PriceHigh,
    Name,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<CatalogProduct>,
}

/// The product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
}

impl Catalog {
    /// Load and validate the catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, `Parse` if it is
    /// not a valid catalog document, and `Invalid` if validation fails.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse and validate a catalog document (`{"products": [...]}`).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` or `CatalogError::Invalid`.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::from_products(file.products)
    }

    /// Build a catalog from products, validating them.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` on an empty or duplicate slug, a
    /// duplicate size, or a variant mapped for a size the product does not list.
    pub fn from_products(products: Vec<CatalogProduct>) -> Result<Self, CatalogError> {
        let mut slugs = HashSet::new();
        for product in &products {
            if product.slug.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "product '{}' has an empty slug",
                    product.name
                )));
            }
            if !slugs.insert(product.slug.as_str()) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate slug '{}'",
                    product.slug
                )));
            }

            let mut sizes = HashSet::new();
            for size in &product.sizes {
                if !sizes.insert(size.as_str()) {
                    return Err(CatalogError::Invalid(format!(
                        "duplicate size '{size}' on '{}'",
                        product.slug
                    )));
                }
            }

            for (size, variant_id) in &product.shopify_variants {
                if !sizes.contains(size.as_str()) {
                    return Err(CatalogError::Invalid(format!(
                        "variant mapped for unlisted size '{size}' on '{}'",
                        product.slug
                    )));
                }
                if variant_id.trim().is_empty() {
                    return Err(CatalogError::Invalid(format!(
                        "empty variant ID for size '{size}' on '{}'",
                        product.slug
                    )));
                }
            }
        }

        Ok(Self { products })
    }

    /// Look up a product by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&CatalogProduct> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Platform variant ID for a product and size.
    #[must_use]
    pub fn variant_id(&self, slug: &str, size: &str) -> Option<&str> {
        self.get(slug).and_then(|p| p.variant_id(size))
    }

    /// Map cart lines to checkout lines, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first line whose product or size has no variant ID.
    pub fn resolve_line_items(
        &self,
        items: &[CartLineItem],
    ) -> Result<Vec<CheckoutLineInput>, CatalogError> {
        items
            .iter()
            .map(|item| {
                let product = self
                    .get(&item.product_key)
                    .ok_or_else(|| CatalogError::UnknownProduct(item.product_key.clone()))?;

                let variant_id = product.variant_id(&item.variant_key).ok_or_else(|| {
                    let name = if item.display_name.is_empty() {
                        product.name.clone()
                    } else {
                        item.display_name.clone()
                    };
                    CatalogError::UnknownVariant {
                        name,
                        size: item.variant_key.clone(),
                    }
                })?;

                Ok(CheckoutLineInput {
                    variant_id: variant_id.to_owned(),
                    quantity: item.quantity,
                })
            })
            .collect()
    }

    /// Products matching `status`, ordered by `sort`.
    ///
    /// Sorts are stable, so ties keep catalog order.
    #[must_use]
    pub fn filter_and_sort(&self, status: StatusFilter, sort: SortOrder) -> Vec<&CatalogProduct> {
        let mut products: Vec<&CatalogProduct> = self
            .products
            .iter()
            .filter(|p| status.matches(p.status))
            .collect();

        match sort {
            SortOrder::Default => {}
            SortOrder::PriceLow => products.sort_by_key(|p| p.price),
            SortOrder::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Name => products.sort_by_cached_key(|p| p.name.to_lowercase()),
        }

        products
    }
}
