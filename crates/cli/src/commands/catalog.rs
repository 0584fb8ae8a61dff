//! Catalog commands.

use std::path::Path;

use soirn_storefront::catalog::{Catalog, CatalogError};

/// Load and validate a catalog file, then print a summary.
///
/// # Errors
///
/// Returns the load or validation error.
pub fn validate(path: &Path) -> Result<(), CatalogError> {
    let catalog = Catalog::load(path)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}: {} products", path.display(), catalog.products().len());
        for product in catalog.products() {
            let mapped = product.shopify_variants.len();
            let sizes = product.sizes.len();
            println!(
                "  {:<32} {:>10}  {:<12} variants {mapped}/{sizes}",
                product.slug,
                product.price().display(),
                product.status.label(),
            );
        }
    }

    let unmapped: Vec<_> = catalog
        .products()
        .iter()
        .filter(|p| p.shopify_variants.len() < p.sizes.len())
        .map(|p| p.slug.as_str())
        .collect();
    if !unmapped.is_empty() {
        tracing::warn!(products = ?unmapped, "Some sizes have no Shopify variant and cannot be checked out");
    }

    Ok(())
}
