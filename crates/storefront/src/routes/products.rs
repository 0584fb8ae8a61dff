//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::{CatalogProduct, SortOrder, StatusFilter};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub sort: SortOrder,
}

/// Product with display prices.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView<'a> {
    #[serde(flatten)]
    pub product: &'a CatalogProduct,
    pub status_label: &'static str,
    pub price_formatted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price_formatted: Option<String>,
}

impl<'a> From<&'a CatalogProduct> for ProductView<'a> {
    fn from(product: &'a CatalogProduct) -> Self {
        Self {
            product,
            status_label: product.status.label(),
            price_formatted: product.price().display(),
            compare_at_price_formatted: product.compare_at_price().map(|p| p.display()),
        }
    }
}

/// Product listing, filtered by status and sorted.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Json<serde_json::Value> {
    let products: Vec<ProductView<'_>> = state
        .catalog()
        .filter_and_sort(query.status, query.sort)
        .into_iter()
        .map(ProductView::from)
        .collect();

    Json(serde_json::json!({ "products": products }))
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let product = state
        .catalog()
        .get(&slug)
        .ok_or_else(|| AppError::NotFound(slug.clone()))?;

    Ok(Json(serde_json::json!({ "product": ProductView::from(product) })))
}
