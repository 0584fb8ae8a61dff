//! Integration tests for the session cart API and cart checkout.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use soirn_integration_tests::{CheckoutScript, TestContext};
use soirn_storefront::shopify::CheckoutLineInput;

fn hoodie(size: &str) -> Value {
    json!({
        "productKey": "drop-001-hoodie-black",
        "variantKey": size,
        "displayName": "Drop 001 Hoodie - Black",
        "unitPriceMinorUnits": 14000,
        "imageRef": "/products/hoodie-1.jpg",
    })
}

fn with_quantity(mut item: Value, quantity: u32) -> Value {
    item["quantity"] = json!(quantity);
    item
}

#[tokio::test]
async fn test_new_session_has_empty_cart() {
    let mut ctx = TestContext::new();

    let resp = ctx.get("/api/cart").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["items"], json!([]));
    assert_eq!(resp.body["isOpen"], false);
    assert_eq!(resp.body["subtotal"], 0);
    assert_eq!(resp.body["count"], 0);
}

#[tokio::test]
async fn test_add_merges_same_variant_and_opens_drawer() {
    let mut ctx = TestContext::new();

    ctx.post("/api/cart/add", &hoodie("M").to_string()).await;
    let resp = ctx
        .post("/api/cart/add", &with_quantity(hoodie("M"), 2).to_string())
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let items = resp.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(resp.body["isOpen"], true);
    assert_eq!(resp.body["subtotal"], 42_000);
    assert_eq!(resp.body["count"], 3);
    assert_eq!(resp.body["subtotalFormatted"], "€420.00");
}

#[tokio::test]
async fn test_cart_persists_across_requests() {
    let mut ctx = TestContext::new();

    ctx.post("/api/cart/add", &hoodie("S").to_string()).await;
    ctx.post("/api/cart/add", &hoodie("M").to_string()).await;
    let resp = ctx.get("/api/cart").await;

    let items = resp.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["variantKey"], "S");
    assert_eq!(items[1]["variantKey"], "M");
}

#[tokio::test]
async fn test_update_and_remove() {
    let mut ctx = TestContext::new();
    ctx.post("/api/cart/add", &hoodie("S").to_string()).await;
    ctx.post("/api/cart/add", &hoodie("M").to_string()).await;

    let resp = ctx
        .post(
            "/api/cart/update",
            r#"{"productKey":"drop-001-hoodie-black","variantKey":"S","quantity":4}"#,
        )
        .await;
    assert_eq!(resp.body["items"][0]["quantity"], 4);
    assert_eq!(resp.body["count"], 5);

    let resp = ctx
        .post(
            "/api/cart/update",
            r#"{"productKey":"drop-001-hoodie-black","variantKey":"S","quantity":0}"#,
        )
        .await;
    assert_eq!(resp.body["items"].as_array().unwrap().len(), 1);

    let resp = ctx
        .post(
            "/api/cart/remove",
            r#"{"productKey":"drop-001-hoodie-black","variantKey":"M"}"#,
        )
        .await;
    assert_eq!(resp.body["items"], json!([]));
    assert_eq!(resp.body["subtotal"], 0);
}

#[tokio::test]
async fn test_drawer_visibility() {
    let mut ctx = TestContext::new();

    let opened = ctx.post("/api/cart/open", "").await;
    let toggled = ctx.post("/api/cart/toggle", "").await;
    let toggled_again = ctx.post("/api/cart/toggle", "").await;
    let closed = ctx.post("/api/cart/close", "").await;

    assert_eq!(opened.body["isOpen"], true);
    assert_eq!(toggled.body["isOpen"], false);
    assert_eq!(toggled_again.body["isOpen"], true);
    assert_eq!(closed.body["isOpen"], false);
}

#[tokio::test]
async fn test_add_requires_keys() {
    let mut ctx = TestContext::new();
    let mut item = hoodie("M");
    item["variantKey"] = json!(" ");

    let resp = ctx.post("/api/cart/add", &item.to_string()).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_empty_cart_is_rejected() {
    let mut ctx = TestContext::new();

    let resp = ctx.post("/api/cart/checkout", "").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({"error": "Cart is empty"}));
    assert!(ctx.checkout.calls().await.is_empty());
}

#[tokio::test]
async fn test_checkout_resolves_variants_and_clears_cart() {
    let mut ctx = TestContext::new();
    ctx.post("/api/cart/add", &with_quantity(hoodie("M"), 2).to_string())
        .await;

    let resp = ctx.post("/api/cart/checkout", "").await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body["checkoutUrl"],
        "https://soirn.myshopify.com/cart/c/c1"
    );
    assert_eq!(
        ctx.checkout.calls().await,
        vec![vec![CheckoutLineInput {
            variant_id: "gid://shopify/ProductVariant/1002".to_string(),
            quantity: 2,
        }]]
    );

    let cart = ctx.get("/api/cart").await;
    assert_eq!(cart.body["items"], json!([]));
    assert_eq!(cart.body["isOpen"], false);
}

#[tokio::test]
async fn test_checkout_with_unmapped_size_makes_no_platform_call() {
    let mut ctx = TestContext::new();
    ctx.post("/api/cart/add", &hoodie("M").to_string()).await;
    ctx.post("/api/cart/add", &hoodie("L").to_string()).await;

    let resp = ctx.post("/api/cart/checkout", "").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body,
        json!({"error": "Variant ID not found for Drop 001 Hoodie - Black - L"})
    );
    assert!(ctx.checkout.calls().await.is_empty());

    let cart = ctx.get("/api/cart").await;
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_checkout_with_unknown_product() {
    let mut ctx = TestContext::new();
    let mut item = hoodie("M");
    item["productKey"] = json!("discontinued-cap");
    ctx.post("/api/cart/add", &item.to_string()).await;

    let resp = ctx.post("/api/cart/checkout", "").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body,
        json!({"error": "Product not found: discontinued-cap"})
    );
}

#[tokio::test]
async fn test_failed_checkout_keeps_cart() {
    let mut ctx = TestContext::new();
    ctx.checkout.set_script(CheckoutScript::Fail).await;
    ctx.post("/api/cart/add", &hoodie("S").to_string()).await;

    let resp = ctx.post("/api/cart/checkout", "").await;

    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body, json!({"error": "Failed to create checkout"}));

    let cart = ctx.get("/api/cart").await;
    assert_eq!(cart.body["count"], 1);
}

#[tokio::test]
async fn test_malformed_add_is_json_error() {
    let mut ctx = TestContext::new();

    let resp = ctx.post("/api/cart/add", "not json").await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({"error": "Invalid cart request"}));
}

#[tokio::test]
async fn test_malformed_update_is_json_error() {
    let mut ctx = TestContext::new();
    ctx.post("/api/cart/add", &hoodie("M").to_string()).await;

    let resp = ctx
        .post(
            "/api/cart/update",
            r#"{"productKey":"drop-001-hoodie-black","variantKey":"M","quantity":"x"}"#,
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({"error": "Invalid cart request"}));

    let cart = ctx.get("/api/cart").await;
    assert_eq!(cart.body["count"], 1);
}

#[tokio::test]
async fn test_malformed_remove_is_json_error() {
    let mut ctx = TestContext::new();

    let resp = ctx.post("/api/cart/remove", r#"{"productKey":1}"#).await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body, json!({"error": "Invalid cart request"}));
}

#[tokio::test]
async fn test_cart_rate_limit_is_json_error() {
    let mut ctx = TestContext::new();

    let mut last = ctx.get("/api/cart").await;
    for _ in 0..60 {
        if last.status == StatusCode::TOO_MANY_REQUESTS {
            break;
        }
        last = ctx.get("/api/cart").await;
    }

    assert_eq!(last.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        last.body,
        json!({"error": "Too many requests. Try again soon."})
    );
    assert!(last.headers.contains_key("retry-after"));
}
