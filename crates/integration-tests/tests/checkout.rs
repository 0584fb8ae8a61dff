//! Integration tests for hosted checkout creation from line items.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::json;

use soirn_integration_tests::{CheckoutScript, TestContext};
use soirn_storefront::shopify::CheckoutLineInput;

const CREATE: &str = "/api/checkout/create";

#[tokio::test]
async fn test_create_returns_checkout_session() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post(
            CREATE,
            r#"{"lineItems":[
                {"variantId":"gid://shopify/ProductVariant/1002","quantity":2},
                {"variantId":"gid://shopify/ProductVariant/2001","quantity":1}
            ]}"#,
        )
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body,
        json!({
            "checkoutId": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://soirn.myshopify.com/cart/c/c1",
        })
    );

    let calls = ctx.checkout.calls().await;
    assert_eq!(
        calls,
        vec![vec![
            CheckoutLineInput {
                variant_id: "gid://shopify/ProductVariant/1002".to_string(),
                quantity: 2,
            },
            CheckoutLineInput {
                variant_id: "gid://shopify/ProductVariant/2001".to_string(),
                quantity: 1,
            },
        ]]
    );
}

#[tokio::test]
async fn test_missing_line_items_never_reach_platform() {
    let mut ctx = TestContext::new();

    for body in [r"{}", r#"{"lineItems":[]}"#, r#"{"lineItems":"x"}"#, "nope"] {
        let resp = ctx.post(CREATE, body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(
            resp.body,
            json!({"error": "Line items are required"}),
            "body: {body}"
        );
    }
    assert!(ctx.checkout.calls().await.is_empty());
}

#[tokio::test]
async fn test_invalid_line_is_reported_by_index() {
    let mut ctx = TestContext::new();

    let resp = ctx
        .post(
            CREATE,
            r#"{"lineItems":[
                {"variantId":"gid://shopify/ProductVariant/1002","quantity":1},
                {"variantId":"gid://shopify/ProductVariant/1001","quantity":0}
            ]}"#,
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({"error": "Invalid line item at index 1"}));
    assert!(ctx.checkout.calls().await.is_empty());
}

#[tokio::test]
async fn test_platform_user_error_is_400_with_message() {
    let mut ctx = TestContext::new();
    ctx.checkout
        .set_script(CheckoutScript::Reject(
            "The merchandise with id gid://shopify/ProductVariant/1 does not exist.".to_string(),
        ))
        .await;

    let resp = ctx
        .post(
            CREATE,
            r#"{"lineItems":[{"variantId":"gid://shopify/ProductVariant/1","quantity":1}]}"#,
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body["error"],
        "The merchandise with id gid://shopify/ProductVariant/1 does not exist."
    );
}

#[tokio::test]
async fn test_platform_failure_is_generic_500() {
    let mut ctx = TestContext::new();
    ctx.checkout.set_script(CheckoutScript::Fail).await;

    let resp = ctx
        .post(
            CREATE,
            r#"{"lineItems":[{"variantId":"gid://shopify/ProductVariant/1002","quantity":1}]}"#,
        )
        .await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body, json!({"error": "Failed to create checkout"}));
}
