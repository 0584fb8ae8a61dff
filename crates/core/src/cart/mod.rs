//! Shopping cart store.
//!
//! The cart is a small reducer over an ordered list of line items keyed by
//! (product, variant). It never fails: corrupt persisted data degrades to an
//! empty cart and operations on missing lines are no-ops.
//!
//! # Persistence
//!
//! Every change to the line items writes the full list as a JSON array to a
//! [`CartSlot`] under [`CART_STORAGE_KEY`]. Concurrent writers to the same slot
//! are last-write-wins; nothing here coordinates them.
//!
//! # Example
//!
//! ```
//! use soirn_core::cart::{CartItemInput, CartStore, MemorySlot};
//!
//! let mut cart = CartStore::load(MemorySlot::default());
//! let hoodie = CartItemInput {
//!     product_key: "drop-001-hoodie-black".to_string(),
//!     variant_key: "M".to_string(),
//!     display_name: "Drop 001 Hoodie".to_string(),
//!     unit_price_minor_units: 14000,
//!     image_ref: "/products/hoodie-1.jpg".to_string(),
//! };
//!
//! cart.add_item(hoodie.clone(), 1);
//! cart.add_item(hoodie, 2);
//! assert_eq!(cart.items().len(), 1);
//! assert_eq!(cart.count(), 3);
//! assert_eq!(cart.subtotal(), 42000);
//! ```

mod line;
mod slot;
mod store;

pub use line::{CartItemInput, CartLineItem};
pub use slot::{CartSlot, MemorySlot};
pub use store::{CartSnapshot, CartStore, hydrate, serialize};

/// Fixed key of the durable cart slot.
pub const CART_STORAGE_KEY: &str = "soirn_cart_v1";
