use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::watch;

use crate::models::{CartLine, ItemType, NewCartLine};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity is too large")]
    QuantityTooLarge(i64),
}

/// In-memory cart of one user.
///
/// The ordered list of lines lives inside a `watch` channel: every mutation
/// publishes the new snapshot to all subscribers before it returns, and
/// `items()` always reads the latest published value.
#[derive(Debug)]
pub struct Cart {
    lines: watch::Sender<Vec<CartLine>>,
    submitting: AtomicBool,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        let (lines, _) = watch::channel(Vec::new());
        Self {
            lines,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn items(&self) -> Vec<CartLine> {
        self.lines.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.borrow().is_empty()
    }

    pub fn add_one(&self, item: NewCartLine) {
        self.add_item(item, 1);
    }

    /// Adds `quantity` units, merging with an existing line of the same
    /// `(item_id, item_type)`. On merge the first-seen name and price are kept.
    pub fn add_item(&self, item: NewCartLine, quantity: u32) {
        if quantity == 0 {
            tracing::debug!(item_id = item.item_id, item_type = %item.item_type, "ignoring add with zero quantity");
            return;
        }

        self.lines.send_modify(|lines| {
            match lines
                .iter_mut()
                .find(|line| line.matches(item.item_id, item.item_type))
            {
                Some(line) => line.quantity = line.quantity.saturating_add(quantity),
                None => lines.push(CartLine {
                    item_id: item.item_id,
                    item_type: item.item_type,
                    item_name: item.item_name,
                    unit_price: item.unit_price,
                    quantity,
                }),
            }
        });
        tracing::debug!(item_id = item.item_id, item_type = %item.item_type, quantity, "cart item added");
    }

    /// Sets the quantity of an existing line; zero or less removes it.
    /// Unknown lines are left alone and nobody is notified. A quantity that
    /// does not fit a line is refused before anything changes.
    pub fn update_quantity(
        &self,
        item_id: i64,
        item_type: ItemType,
        quantity: i64,
    ) -> Result<(), CartError> {
        let new_quantity = match quantity {
            ..=0 => None,
            _ => Some(u32::try_from(quantity).map_err(|_| CartError::QuantityTooLarge(quantity))?),
        };

        let changed = self.lines.send_if_modified(|lines| {
            let Some(idx) = lines
                .iter()
                .position(|line| line.matches(item_id, item_type))
            else {
                return false;
            };
            match new_quantity {
                None => {
                    lines.remove(idx);
                }
                Some(quantity) => lines[idx].quantity = quantity,
            }
            true
        });
        tracing::debug!(item_id, item_type = %item_type, quantity, changed, "cart quantity updated");
        Ok(())
    }

    pub fn remove_item(&self, item_id: i64, item_type: ItemType) {
        self.lines
            .send_modify(|lines| lines.retain(|line| !line.matches(item_id, item_type)));
        tracing::debug!(item_id, item_type = %item_type, "cart item removed");
    }

    pub fn clear(&self) {
        self.lines.send_replace(Vec::new());
        tracing::debug!("cart cleared");
    }

    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            rx: self.lines.subscribe(),
        }
    }

    /// Marks a checkout as in flight. Returns `None` if one already is; the
    /// mark is released when the returned guard drops.
    pub fn begin_checkout(&self) -> Option<CheckoutGuard<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CheckoutGuard { cart: self })
    }

    pub fn checkout_in_flight(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct CheckoutGuard<'a> {
    cart: &'a Cart,
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.cart.submitting.store(false, Ordering::Release);
    }
}

/// A view watching one cart. Dropping it does not affect the cart.
#[derive(Debug, Clone)]
pub struct CartSubscription {
    rx: watch::Receiver<Vec<CartLine>>,
}

impl CartSubscription {
    pub fn current(&self) -> Vec<CartLine> {
        self.rx.borrow().clone()
    }

    /// Whether a snapshot was published since this subscription last looked.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Waits for the next published snapshot. `None` once the cart is gone.
    pub async fn changed(&mut self) -> Option<Vec<CartLine>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Marks the current snapshot as seen and returns it.
    pub fn seen(&mut self) -> Vec<CartLine> {
        self.rx.borrow_and_update().clone()
    }
}

/// One cart per signed-in user (keyed by token subject), created on first use.
#[derive(Debug, Default)]
pub struct CartRegistry {
    carts: RwLock<HashMap<String, Arc<Cart>>>,
}

impl CartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cart_for(&self, subject: &str) -> Arc<Cart> {
        if let Some(cart) = self.carts.read().get(subject) {
            return Arc::clone(cart);
        }
        let mut carts = self.carts.write();
        let cart = carts.entry(subject.to_string()).or_insert_with(|| {
            tracing::debug!(subject, "creating cart");
            Arc::new(Cart::new())
        });
        Arc::clone(cart)
    }

    pub fn len(&self) -> usize {
        self.carts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.carts.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::CartSummary;

    fn item(item_id: i64, item_type: ItemType, name: &str, price: i64) -> NewCartLine {
        NewCartLine {
            item_id,
            item_type,
            item_name: name.to_string(),
            unit_price: Decimal::from(price),
        }
    }

    #[test]
    fn repeated_adds_merge_into_one_line() {
        let cart = Cart::new();
        for qty in [2, 3, 1, 4] {
            cart.add_item(item(7, ItemType::Food, "Nachos", 6), qty);
        }

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 10);
    }

    #[test]
    fn first_seen_name_and_price_win() {
        let cart = Cart::new();
        cart.add_item(item(1, ItemType::Food, "Pizza", 10), 2);
        cart.add_item(item(1, ItemType::Food, "Pizza-renamed", 99), 1);

        assert_eq!(
            cart.items(),
            vec![CartLine {
                item_id: 1,
                item_type: ItemType::Food,
                item_name: "Pizza".into(),
                unit_price: Decimal::from(10),
                quantity: 3,
            }]
        );
    }

    #[test]
    fn same_id_different_type_are_separate_lines() {
        let cart = Cart::new();
        cart.add_one(item(1, ItemType::Food, "Pizza", 10));
        cart.add_one(item(1, ItemType::Merch, "Cap", 15));

        let items = cart.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item_type, ItemType::Food);
        assert_eq!(items[1].item_type, ItemType::Merch);
    }

    #[test]
    fn zero_quantity_add_is_ignored() {
        let cart = Cart::new();
        cart.add_item(item(1, ItemType::Food, "Pizza", 10), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn update_to_zero_removes_the_line() {
        let cart = Cart::new();
        cart.add_one(item(1, ItemType::Food, "Pizza", 10));
        cart.add_one(item(2, ItemType::Food, "Soda", 3));

        cart.update_quantity(1, ItemType::Food, 0).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_id, 2);
    }

    #[test]
    fn update_below_zero_removes_and_positive_sets() {
        let cart = Cart::new();
        cart.add_one(item(1, ItemType::Merch, "Cap", 15));
        cart.add_one(item(2, ItemType::Merch, "Mug", 8));

        cart.update_quantity(2, ItemType::Merch, 6).unwrap();
        cart.update_quantity(1, ItemType::Merch, -3).unwrap();

        let items = cart.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_id, 2);
        assert_eq!(items[0].quantity, 6);
    }

    #[test]
    fn update_of_unknown_line_is_silent() {
        let cart = Cart::new();
        cart.add_one(item(1, ItemType::Food, "Pizza", 10));
        let mut sub = cart.subscribe();
        sub.seen();

        cart.update_quantity(1, ItemType::Merch, 4).unwrap();

        assert!(!sub.has_changed());
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn oversized_update_is_refused_and_silent() {
        let cart = Cart::new();
        cart.add_item(item(1, ItemType::Food, "Pizza", 10), 3);
        let mut sub = cart.subscribe();
        sub.seen();

        let too_many = i64::from(u32::MAX) + 1;
        assert_eq!(
            cart.update_quantity(1, ItemType::Food, too_many),
            Err(CartError::QuantityTooLarge(too_many))
        );

        assert!(!sub.has_changed());
        assert_eq!(cart.items()[0].quantity, 3);

        cart.update_quantity(1, ItemType::Food, i64::from(u32::MAX)).unwrap();
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn removing_absent_item_is_a_noop() {
        let cart = Cart::new();
        cart.add_item(item(1, ItemType::Food, "Pizza", 10), 2);
        let before = cart.items();

        cart.remove_item(9, ItemType::Food);
        cart.remove_item(1, ItemType::Merch);

        assert_eq!(cart.items(), before);
    }

    #[test]
    fn clear_always_empties() {
        let cart = Cart::new();
        cart.clear();
        assert!(cart.is_empty());

        cart.add_item(item(1, ItemType::Food, "Pizza", 10), 2);
        cart.add_item(item(3, ItemType::Merch, "Cap", 15), 1);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_follow_the_snapshot() {
        let cart = Cart::new();
        cart.add_item(item(1, ItemType::Food, "Fries", 5), 2);
        cart.add_item(item(2, ItemType::Food, "Soda", 3), 1);

        let summary = CartSummary::from_lines(&cart.items());
        assert_eq!(summary.total_amount, Decimal::from(13));
        assert_eq!(summary.total_items, 3);
    }

    #[test]
    fn every_subscriber_sees_each_mutation_synchronously() {
        let cart = Cart::new();
        let mut first = cart.subscribe();
        let mut second = cart.subscribe();

        cart.add_item(item(1, ItemType::Food, "Pizza", 10), 2);
        assert!(first.has_changed());
        assert!(second.has_changed());
        assert_eq!(first.seen()[0].quantity, 2);

        cart.update_quantity(1, ItemType::Food, 5).unwrap();
        assert_eq!(first.seen()[0].quantity, 5);
        assert_eq!(second.seen()[0].quantity, 5);

        drop(second);
        cart.clear();
        assert!(first.seen().is_empty());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn changed_yields_the_new_snapshot() {
        let cart = Arc::new(Cart::new());
        let mut sub = cart.subscribe();

        let writer = Arc::clone(&cart);
        tokio::spawn(async move {
            writer.add_item(item(4, ItemType::Merch, "Plush", 20), 1);
        });

        let snapshot = sub.changed().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].item_name, "Plush");
    }

    #[test]
    fn only_one_checkout_at_a_time() {
        let cart = Cart::new();
        let guard = cart.begin_checkout().unwrap();
        assert!(cart.checkout_in_flight());
        assert!(cart.begin_checkout().is_none());

        drop(guard);
        assert!(!cart.checkout_in_flight());
        assert!(cart.begin_checkout().is_some());
    }

    #[test]
    fn registry_hands_out_one_cart_per_user() {
        let registry = CartRegistry::new();
        let a = registry.cart_for("alice@park.test");
        a.add_one(item(1, ItemType::Food, "Pizza", 10));

        assert_eq!(registry.cart_for("alice@park.test").len(), 1);
        assert!(registry.cart_for("bob@park.test").is_empty());
        assert_eq!(registry.len(), 2);
    }
}
