//! Cart state container.

use serde::Serialize;
use serde_json::Value;

use super::line::{CartItemInput, CartLineItem};
use super::slot::{CartSlot, MemorySlot};

/// The cart: ordered line items, a visibility flag, and the slot they persist to.
///
/// `items` is only ever changed through the operations below, and each change
/// is written to the slot before the operation returns.
#[derive(Debug, Clone)]
pub struct CartStore<S: CartSlot = MemorySlot> {
    items: Vec<CartLineItem>,
    is_open: bool,
    slot: S,
}

/// Serializable view of the cart, with derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartLineItem>,
    pub is_open: bool,
    pub subtotal: u64,
    pub count: u64,
}

impl<S: CartSlot> CartStore<S> {
    /// Hydrate a cart from its slot.
    ///
    /// A missing slot, invalid JSON, or anything other than an array yields an
    /// empty cart. The cart starts closed.
    pub fn load(slot: S) -> Self {
        let items = hydrate(slot.read().as_deref());
        Self {
            items,
            is_open: false,
            slot,
        }
    }

    /// Add `quantity` of an item, merging with an existing line for the same
    /// (product, variant). Always opens the cart.
    pub fn add_item(&mut self, item: CartItemInput, quantity: u32) {
        self.is_open = true;
        if quantity == 0 {
            return;
        }

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.matches(&item.product_key, &item.variant_key))
        {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(item.into_line(quantity));
        }
        self.persist();
    }

    /// Add a single unit of an item.
    pub fn add_item_once(&mut self, item: CartItemInput) {
        self.add_item(item, 1);
    }

    /// Remove the line for (product, variant), if present.
    pub fn remove_item(&mut self, product_key: &str, variant_key: &str) {
        let before = self.items.len();
        self.items
            .retain(|line| !line.matches(product_key, variant_key));
        if self.items.len() != before {
            self.persist();
        }
    }

    /// Set the quantity of an existing line. Zero or less removes it.
    pub fn set_quantity(&mut self, product_key: &str, variant_key: &str, quantity: i64) {
        let Some(position) = self
            .items
            .iter()
            .position(|line| line.matches(product_key, variant_key))
        else {
            return;
        };

        if quantity <= 0 {
            self.items.remove(position);
        } else if let Some(line) = self.items.get_mut(position) {
            line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        }
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    pub const fn open(&mut self) {
        self.is_open = true;
    }

    pub const fn close(&mut self) {
        self.is_open = false;
    }

    pub const fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    /// Restore the visibility flag (it is not part of the durable slot).
    pub const fn set_open(&mut self, is_open: bool) {
        self.is_open = is_open;
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price * quantity` over all lines, in minor units.
    #[must_use]
    pub fn subtotal(&self) -> u64 {
        self.items
            .iter()
            .map(CartLineItem::line_total)
            .fold(0, u64::saturating_add)
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items
            .iter()
            .map(|line| u64::from(line.quantity))
            .sum()
    }

    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            is_open: self.is_open,
            subtotal: self.subtotal(),
            count: self.count(),
        }
    }

    #[must_use]
    pub const fn slot(&self) -> &S {
        &self.slot
    }

    /// Consume the store, returning its slot.
    #[must_use]
    pub fn into_slot(self) -> S {
        self.slot
    }

    fn persist(&mut self) {
        if let Ok(raw) = serialize(&self.items) {
            self.slot.write(&raw);
        }
    }
}

impl Default for CartStore<MemorySlot> {
    fn default() -> Self {
        Self::load(MemorySlot::default())
    }
}

/// Parse a stored cart.
///
/// Never fails. Anything that is not a JSON array gives an empty list.
/// Within an array, entries that are `null`, malformed, or have a zero
/// quantity are dropped one by one, and repeated (product, variant) pairs are
/// merged so the one-line-per-pair invariant holds even for hand-edited data.
#[must_use]
pub fn hydrate(raw: Option<&str>) -> Vec<CartLineItem> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };

    let mut items: Vec<CartLineItem> = Vec::with_capacity(entries.len());
    for entry in entries {
        let Ok(line) = serde_json::from_value::<CartLineItem>(entry) else {
            continue;
        };
        if line.quantity == 0 {
            continue;
        }
        match items
            .iter_mut()
            .find(|existing| existing.matches(&line.product_key, &line.variant_key))
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => items.push(line),
        }
    }
    items
}

/// Serialize line items to the JSON array stored in the slot.
///
/// # Errors
///
/// Returns the `serde_json` error; plain line items always serialize.
pub fn serialize(items: &[CartLineItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn empty_cart() -> CartStore {
        CartStore::default()
    }

    fn item(product_key: &str, variant_key: &str, price: u64) -> CartItemInput {
        CartItemInput {
            product_key: product_key.to_string(),
            variant_key: variant_key.to_string(),
            display_name: format!("{product_key} ({variant_key})"),
            unit_price_minor_units: price,
            image_ref: format!("/products/{product_key}.jpg"),
        }
    }

    #[test]
    fn test_new_cart_is_empty_and_closed() {
        let cart = empty_cart();
        assert!(cart.is_empty());
        assert!(!cart.is_open());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.subtotal(), 0);
    }

    #[test]
    fn test_add_merges_same_product_and_variant() {
        let mut cart = empty_cart();
        for quantity in [1, 2, 4] {
            cart.add_item(item("a", "M", 1000), quantity);
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 7);
    }

    #[test]
    fn test_add_keeps_variants_apart_in_insertion_order() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1000));
        cart.add_item_once(item("b", "L", 2000));
        cart.add_item_once(item("a", "S", 1000));
        cart.add_item_once(item("a", "M", 1000));

        let keys: Vec<_> = cart
            .items()
            .iter()
            .map(|line| (line.product_key.as_str(), line.variant_key.as_str()))
            .collect();
        assert_eq!(keys, vec![("a", "M"), ("b", "L"), ("a", "S")]);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_add_opens_cart() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1000));
        assert!(cart.is_open());

        cart.close();
        cart.add_item(item("a", "M", 1000), 0);
        assert!(cart.is_open());
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_set_quantity_updates_line() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1000));
        cart.set_quantity("a", "M", 5);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes_line() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1000));
        cart.add_item_once(item("b", "L", 2000));

        cart.set_quantity("a", "M", 0);
        cart.set_quantity("b", "L", -3);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_line_is_noop() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1000));
        let before = cart.slot().clone();

        cart.set_quantity("a", "XL", 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.slot(), &before);
    }

    #[test]
    fn test_set_quantity_saturates() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1));
        cart.set_quantity("a", "M", i64::MAX);
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_quantities_stay_positive() {
        let mut cart = empty_cart();
        cart.add_item(item("a", "M", 1000), 3);
        cart.add_item(item("b", "L", 2000), 1);
        cart.set_quantity("a", "M", 1);
        cart.set_quantity("b", "L", 0);
        cart.add_item(item("c", "S", 500), 0);
        cart.set_quantity("a", "M", -1);
        cart.add_item(item("b", "L", 2000), 2);

        assert!(cart.items().iter().all(|line| line.quantity >= 1));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_missing_line_is_noop() {
        let mut cart = empty_cart();
        cart.remove_item("nope", "M");
        assert!(cart.is_empty());
        assert!(!cart.slot().is_dirty());
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let mut cart = empty_cart();
        cart.add_item(item("a", "M", 1000), 2);
        cart.remove_item("a", "M");

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.subtotal(), 0);
    }

    #[test]
    fn test_derived_values_track_items() {
        let mut cart = empty_cart();
        cart.add_item(item("a", "M", 1000), 2);
        cart.add_item(item("b", "L", 2000), 1);
        assert_eq!(cart.subtotal(), 4000);
        assert_eq!(cart.count(), 3);

        // Poke the line directly: totals must be recomputed, not cached.
        cart.items[0].quantity = 5;
        assert_eq!(cart.subtotal(), 7000);
        assert_eq!(cart.count(), 6);

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.subtotal, 7000);
        assert_eq!(snapshot.count, 6);
    }

    #[test]
    fn test_subtotal_saturates() {
        let mut cart = empty_cart();
        cart.add_item(item("a", "M", u64::MAX), 2);
        cart.add_item(item("b", "M", 1), 1);
        assert_eq!(cart.subtotal(), u64::MAX);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let mut cart = empty_cart();
        cart.add_item(item("a", "M", 1000), 2);
        assert_eq!(hydrate(cart.slot().raw()), cart.items());

        cart.set_quantity("a", "M", 3);
        assert_eq!(hydrate(cart.slot().raw())[0].quantity, 3);

        cart.clear();
        assert_eq!(cart.slot().raw(), Some("[]"));
    }

    #[test]
    fn test_visibility_does_not_write() {
        let mut cart = empty_cart();
        cart.open();
        cart.toggle();
        cart.toggle();
        assert!(cart.is_open());
        assert!(!cart.slot().is_dirty());
    }

    #[test]
    fn test_reload_reproduces_items() {
        let mut cart = empty_cart();
        cart.add_item(item("a", "M", 1000), 2);
        cart.add_item(item("b", "L", 2000), 1);
        let items = cart.items().to_vec();

        let reloaded = CartStore::load(cart.into_slot());
        assert_eq!(reloaded.items(), items.as_slice());
        assert!(!reloaded.is_open());
    }

    #[test]
    fn test_stored_format_uses_camel_case() {
        let mut cart = empty_cart();
        cart.add_item_once(item("a", "M", 1000));
        let stored: Value = serde_json::from_str(cart.slot().raw().unwrap()).unwrap();
        assert_eq!(stored[0]["productKey"], "a");
        assert_eq!(stored[0]["unitPriceMinorUnits"], 1000);
        assert_eq!(stored[0]["quantity"], 1);
    }

    #[test]
    fn test_hydrate_tolerates_garbage() {
        assert!(hydrate(None).is_empty());
        assert!(hydrate(Some("")).is_empty());
        assert!(hydrate(Some("{not json")).is_empty());
        assert!(hydrate(Some("{\"productKey\":\"a\"}")).is_empty());
        assert!(hydrate(Some("42")).is_empty());
        assert!(hydrate(Some("null")).is_empty());
    }

    #[test]
    fn test_hydrate_drops_bad_entries_and_merges_duplicates() {
        let raw = r#"[
            null,
            {"productKey":"a","variantKey":"M","displayName":"A","unitPriceMinorUnits":1000,"imageRef":"","quantity":1},
            {"productKey":"b"},
            {"productKey":"c","variantKey":"S","unitPriceMinorUnits":500,"quantity":0},
            {"productKey":"a","variantKey":"M","displayName":"A","unitPriceMinorUnits":1000,"imageRef":"","quantity":2},
            {"productKey":"d","variantKey":"L","unitPriceMinorUnits":700,"quantity":1}
        ]"#;

        let items = hydrate(Some(raw));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_key, "a");
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[1].product_key, "d");
        assert_eq!(items[1].display_name, "");
    }

    #[test]
    fn test_load_from_corrupt_slot() {
        let cart = CartStore::load(MemorySlot::with_raw(Some("[[[".to_string())));
        assert!(cart.is_empty());
    }
}
