//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Each handler hydrates a
//! [`CartStore`] from the session slot, applies one operation, and writes the
//! slot back only if the operation touched the items. The drawer visibility
//! flag is stored under its own session key.

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tower_sessions::Session;
use tracing::instrument;

use soirn_core::cart::{CartItemInput, CartSnapshot, CartStore, MemorySlot};
use soirn_core::{CurrencyCode, Price};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::keys;
use crate::shopify::CheckoutSession;
use crate::state::AppState;

/// Cart state returned by every cart endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: CartSnapshot,
    /// Subtotal formatted for display (e.g., "€140.00").
    pub subtotal_formatted: String,
}

impl From<&CartStore> for CartResponse {
    fn from(cart: &CartStore) -> Self {
        let cart = cart.snapshot();
        let subtotal_formatted = Price::new(cart.subtotal, CurrencyCode::EUR).display();
        Self {
            cart,
            subtotal_formatted,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(flatten)]
    pub item: CartItemInput,
    pub quantity: Option<u32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    pub product_key: String,
    pub variant_key: String,
    pub quantity: i64,
}

/// Remove line request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveLineRequest {
    pub product_key: String,
    pub variant_key: String,
}

/// Message for a cart body that does not parse.
pub const INVALID_CART_REQUEST: &str = "Invalid cart request";

/// Parse a cart request body.
///
/// Malformed bodies become a 400 with a fixed message so deserializer
/// details never reach the client.
fn parse_request<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed cart request");
        AppError::BadRequest(INVALID_CART_REQUEST.to_string())
    })
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Hydrate the cart from the session.
///
/// An unreadable slot yields an empty cart.
async fn load_cart(session: &Session) -> CartStore {
    let raw = session
        .get::<String>(keys::CART)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Failed to read cart from session"))
        .ok()
        .flatten();
    let is_open = session
        .get::<bool>(keys::CART_OPEN)
        .await
        .ok()
        .flatten()
        .unwrap_or(false);

    let mut cart = CartStore::load(MemorySlot::with_raw(raw));
    cart.set_open(is_open);
    cart
}

/// Write the cart back to the session and build the response.
async fn save_cart(session: &Session, cart: &CartStore) -> Result<Json<CartResponse>> {
    if cart.slot().is_dirty()
        && let Some(raw) = cart.slot().raw()
    {
        session.insert(keys::CART, raw).await?;
    }
    session.insert(keys::CART_OPEN, cart.is_open()).await?;

    Ok(Json(CartResponse::from(cart)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Json<CartResponse> {
    let cart = load_cart(&session).await;
    Json(CartResponse::from(&cart))
}

/// Add an item, merging with an existing line for the same product and variant.
#[instrument(skip(session, body))]
pub async fn add(session: Session, body: Bytes) -> Result<Json<CartResponse>> {
    let request: AddToCartRequest = parse_request(&body)?;
    if request.item.product_key.trim().is_empty() || request.item.variant_key.trim().is_empty() {
        return Err(AppError::BadRequest(
            "productKey and variantKey are required".to_string(),
        ));
    }

    add_breadcrumb(
        "cart",
        "Added item",
        Some(&[
            ("product", request.item.product_key.as_str()),
            ("variant", request.item.variant_key.as_str()),
        ]),
    );

    let mut cart = load_cart(&session).await;
    cart.add_item(request.item, request.quantity.unwrap_or(1));
    save_cart(&session, &cart).await
}

/// Set a line's quantity. Zero or less removes the line.
#[instrument(skip(session, body))]
pub async fn update(session: Session, body: Bytes) -> Result<Json<CartResponse>> {
    let request: UpdateQuantityRequest = parse_request(&body)?;
    let mut cart = load_cart(&session).await;
    cart.set_quantity(&request.product_key, &request.variant_key, request.quantity);
    save_cart(&session, &cart).await
}

/// Remove a line.
#[instrument(skip(session, body))]
pub async fn remove(session: Session, body: Bytes) -> Result<Json<CartResponse>> {
    let request: RemoveLineRequest = parse_request(&body)?;
    let mut cart = load_cart(&session).await;
    cart.remove_item(&request.product_key, &request.variant_key);
    save_cart(&session, &cart).await
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await;
    cart.clear();
    save_cart(&session, &cart).await
}

/// Show the cart drawer.
#[instrument(skip(session))]
pub async fn open(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await;
    cart.open();
    save_cart(&session, &cart).await
}

/// Hide the cart drawer.
#[instrument(skip(session))]
pub async fn close(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await;
    cart.close();
    save_cart(&session, &cart).await
}

/// Toggle the cart drawer.
#[instrument(skip(session))]
pub async fn toggle(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await;
    cart.toggle();
    save_cart(&session, &cart).await
}

/// Start a hosted checkout for the session cart.
///
/// Every line is resolved to a platform variant before any request leaves
/// the server. The cart is cleared only once the checkout exists; on any
/// failure it is left as it was. Once the checkout exists its URL is always
/// returned, even if clearing the session cart fails.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CheckoutSession>> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    let lines = state.catalog().resolve_line_items(cart.items())?;
    let checkout = state.checkout().create_checkout(&lines).await?;

    Ok(complete_checkout(&session, cart, checkout).await)
}

/// Empty and close the session cart once its checkout exists.
///
/// Clearing is best-effort: the checkout URL is returned regardless.
async fn complete_checkout(
    session: &Session,
    mut cart: CartStore,
    checkout: CheckoutSession,
) -> Json<CheckoutSession> {
    cart.clear();
    cart.close();
    if let Err(e) = save_cart(session, &cart).await {
        tracing::warn!(
            error = %e,
            checkout_id = %checkout.checkout_id,
            "Failed to clear cart after checkout"
        );
    }

    add_breadcrumb(
        "checkout",
        "Redirecting to hosted checkout",
        Some(&[("checkout_id", checkout.checkout_id.as_str())]),
    );

    Json(checkout)
}
