//! Shopping cart store.
//!
//! The cart is a list of [`CartItem`] lines persisted under
//! [`keys::CART`]. A line is identified by product plus size and color;
//! adding an item that matches an existing line merges the quantities.
//!
//! Stock ceilings (`max_stock`) are enforced on every quantity change. A
//! change that would exceed the ceiling is refused with `Ok(false)` and
//! leaves the stored cart untouched; only storage write failures are errors.

use std::sync::Arc;

use lecas_core::{CartItem, LineKey, Price};
use tracing::{debug, instrument};

use crate::events::{ChangeNotifier, StoreEvent};
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Cart state over a key-value store.
#[derive(Clone)]
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    notifier: ChangeNotifier,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore").finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a cart store.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, notifier: ChangeNotifier) -> Self {
        Self { storage, notifier }
    }

    /// All lines, in insertion order.
    ///
    /// An unreadable cart is treated as empty.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        storage::read_json(self.storage.as_ref(), keys::CART)
    }

    /// The line with the given identity, if present.
    #[must_use]
    pub fn line(&self, key: &LineKey) -> Option<CartItem> {
        self.items().into_iter().find(|line| line.matches(key))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Add `quantity` units of `item`.
    ///
    /// Merges into the line with the same product, size and color, or
    /// appends a new line. The incoming item's `max_stock`, when present,
    /// replaces the stored ceiling. The incoming `item.quantity` is ignored.
    ///
    /// Returns `Ok(false)` without changing anything when `quantity` is zero
    /// or the resulting line quantity would exceed the stock ceiling.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be written.
    #[instrument(skip(self, item), fields(product = %item.id))]
    pub fn add(&self, item: CartItem, quantity: u32) -> Result<bool, StorageError> {
        if quantity == 0 {
            return Ok(false);
        }

        let mut items = self.items();
        let key = item.key();

        if let Some(line) = items.iter_mut().find(|line| line.matches(&key)) {
            let ceiling = item.max_stock.or(line.max_stock);
            let merged = line.quantity.saturating_add(quantity);
            if ceiling.is_some_and(|max| merged > max) {
                debug!(merged, ?ceiling, "Merge would exceed stock ceiling");
                return Ok(false);
            }
            line.quantity = merged;
            line.max_stock = ceiling;
        } else {
            if item.exceeds_stock(quantity) {
                debug!(quantity, ceiling = ?item.max_stock, "Quantity exceeds stock ceiling");
                return Ok(false);
            }
            items.push(CartItem { quantity, ..item });
        }

        self.save(&items)?;
        Ok(true)
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity of zero removes the line. Returns `Ok(false)` if the line
    /// does not exist or the quantity exceeds its stock ceiling.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be written.
    #[instrument(skip(self), fields(product = %key.id))]
    pub fn set_quantity(&self, key: &LineKey, quantity: u32) -> Result<bool, StorageError> {
        if quantity == 0 {
            return self.remove(key);
        }

        let mut items = self.items();
        let Some(line) = items.iter_mut().find(|line| line.matches(key)) else {
            return Ok(false);
        };

        if line.exceeds_stock(quantity) {
            debug!(quantity, ceiling = ?line.max_stock, "Quantity exceeds stock ceiling");
            return Ok(false);
        }

        line.quantity = quantity;
        self.save(&items)?;
        Ok(true)
    }

    /// Remove a line. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be written.
    #[instrument(skip(self), fields(product = %key.id))]
    pub fn remove(&self, key: &LineKey) -> Result<bool, StorageError> {
        let mut items = self.items();
        let before = items.len();
        items.retain(|line| !line.matches(key));

        if items.len() == before {
            return Ok(false);
        }

        self.save(&items)?;
        Ok(true)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the empty cart cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.save(&[])
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        count_of(&self.items())
    }

    /// Sum of price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items().iter().map(CartItem::line_total).sum()
    }

    /// Sum of savings against original prices.
    #[must_use]
    pub fn discount(&self) -> Price {
        self.items().iter().map(CartItem::line_discount).sum()
    }

    fn save(&self, items: &[CartItem]) -> Result<(), StorageError> {
        storage::write_json(self.storage.as_ref(), keys::CART, items)?;
        self.notifier.notify(StoreEvent::CartUpdated {
            count: count_of(items),
        });
        Ok(())
    }
}

fn count_of(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0, |total, line| total.saturating_add(line.quantity))
}
