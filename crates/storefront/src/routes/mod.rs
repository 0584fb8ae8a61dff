//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (signup store)
//!
//! # Waitlist
//! POST /api/waitlist           - Join the waitlist (fixed-window rate limit)
//!
//! # Checkout
//! POST /api/checkout/create    - Hosted checkout from resolved line items
//!
//! # Cart (session-backed, governor rate limit)
//! GET  /api/cart               - Cart snapshot
//! POST /api/cart/add           - Add item
//! POST /api/cart/update        - Set quantity (<= 0 removes)
//! POST /api/cart/remove        - Remove line
//! POST /api/cart/clear         - Empty the cart
//! POST /api/cart/open          - Show drawer
//! POST /api/cart/close         - Hide drawer
//! POST /api/cart/toggle        - Toggle drawer
//! POST /api/cart/checkout      - Hosted checkout for the session cart
//!
//! # Products
//! GET  /api/products           - Listing (?status=&sort=)
//! GET  /api/products/{slug}    - Detail
//! ```

pub mod cart;
pub mod checkout;
pub mod products;
pub mod waitlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::middleware::api_rate_limiter;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
        .route("/toggle", post(cart::toggle))
        .route("/checkout", post(cart::checkout))
        .layer(api_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{slug}", get(products::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/api/waitlist", post(waitlist::join))
        .route("/api/checkout/create", post(checkout::create))
        .nest("/api/cart", cart_routes())
        .nest("/api/products", product_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the signup store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.signups().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
