//! Hosted checkout route handler.
//!
//! Accepts already-resolved platform line items and returns the hosted
//! checkout URL. The session cart flow lives in `routes::cart::checkout`.

use axum::{Json, body::Bytes, extract::State};
use serde_json::Value;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::shopify::{CheckoutLineInput, CheckoutSession};
use crate::state::AppState;

/// Largest quantity accepted on a single line.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Create a hosted checkout from `{"lineItems": [{"variantId", "quantity"}]}`.
#[instrument(skip(state, body))]
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Json<CheckoutSession>> {
    let lines = parse_line_items(&body)?;
    let session = state.checkout().create_checkout(&lines).await?;
    Ok(Json(session))
}

/// Parse and validate the `lineItems` array of a checkout request.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the array is missing or empty, or if
/// any line lacks a non-empty `variantId` or a quantity in `1..=999`.
pub fn parse_line_items(body: &[u8]) -> Result<Vec<CheckoutLineInput>> {
    let required = || AppError::BadRequest("Line items are required".to_string());

    let value: Value = serde_json::from_slice(body).map_err(|_| required())?;
    let items = value
        .get("lineItems")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(required)?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let invalid = || AppError::BadRequest(format!("Invalid line item at index {index}"));

            let variant_id = item
                .get("variantId")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .ok_or_else(invalid)?;

            let quantity = item
                .get("quantity")
                .and_then(Value::as_u64)
                .and_then(|q| u32::try_from(q).ok())
                .filter(|q| (1..=MAX_LINE_QUANTITY).contains(q))
                .ok_or_else(invalid)?;

            Ok(CheckoutLineInput {
                variant_id: variant_id.to_owned(),
                quantity,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn error_message(body: &str) -> String {
        parse_line_items(body.as_bytes()).unwrap_err().to_string()
    }

    #[test]
    fn test_parse_line_items_preserves_order() {
        let lines = parse_line_items(
            br#"{"lineItems": [
                {"variantId": "gid://shopify/ProductVariant/2", "quantity": 2},
                {"variantId": "gid://shopify/ProductVariant/1", "quantity": 1}
            ]}"#,
        )
        .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].variant_id, "gid://shopify/ProductVariant/2");
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[1].variant_id, "gid://shopify/ProductVariant/1");
    }

    #[test]
    fn test_missing_or_empty_line_items() {
        assert_eq!(error_message("{}"), "Line items are required");
        assert_eq!(error_message(r#"{"lineItems": []}"#), "Line items are required");
        assert_eq!(error_message(r#"{"lineItems": "x"}"#), "Line items are required");
        assert_eq!(error_message("not json"), "Line items are required");
    }

    #[test]
    fn test_invalid_line_items() {
        assert_eq!(
            error_message(r#"{"lineItems": [{"variantId": "", "quantity": 1}]}"#),
            "Invalid line item at index 0"
        );
        assert_eq!(
            error_message(
                r#"{"lineItems": [{"variantId": "a", "quantity": 1}, {"variantId": "b", "quantity": 0}]}"#
            ),
            "Invalid line item at index 1"
        );
        assert_eq!(
            error_message(r#"{"lineItems": [{"variantId": "a", "quantity": 1000}]}"#),
            "Invalid line item at index 0"
        );
    }
}
