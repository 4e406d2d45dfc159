//! Wishlist store.
//!
//! A set of [`WishlistItem`]s keyed by product id, persisted under
//! [`keys::WISHLIST`] with the same notify-after-write pattern as the cart.

use std::sync::Arc;

use chrono::Utc;
use lecas_core::{ProductId, WishlistItem};
use tracing::instrument;

use crate::events::{ChangeNotifier, StoreEvent};
use crate::storage::{self, KeyValueStore, StorageError, keys};

/// Wishlist state over a key-value store.
#[derive(Clone)]
pub struct WishlistStore {
    storage: Arc<dyn KeyValueStore>,
    notifier: ChangeNotifier,
}

impl std::fmt::Debug for WishlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishlistStore").finish_non_exhaustive()
    }
}

impl WishlistStore {
    /// Create a wishlist store.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>, notifier: ChangeNotifier) -> Self {
        Self { storage, notifier }
    }

    /// All items, oldest first.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistItem> {
        storage::read_json(self.storage.as_ref(), keys::WISHLIST)
    }

    /// Whether `id` is on the wishlist.
    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items().iter().any(|item| &item.id == id)
    }

    /// Number of items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.items().len()
    }

    /// Add an item. Returns `false` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the wishlist cannot be written.
    #[instrument(skip(self, item), fields(product = %item.id))]
    pub fn add(&self, item: WishlistItem) -> Result<bool, StorageError> {
        let mut items = self.items();
        if items.iter().any(|existing| existing.id == item.id) {
            return Ok(false);
        }
        items.push(item);
        self.save(&items)?;
        Ok(true)
    }

    /// Remove an item. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the wishlist cannot be written.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &ProductId) -> Result<bool, StorageError> {
        Ok(self.take(id)?.is_some())
    }

    /// Add `item` if absent, remove it if present.
    ///
    /// Returns whether the item is on the wishlist afterwards. A newly added
    /// item is stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the wishlist cannot be written.
    #[instrument(skip(self, item), fields(product = %item.id))]
    pub fn toggle(&self, item: WishlistItem) -> Result<bool, StorageError> {
        if self.take(&item.id)?.is_some() {
            return Ok(false);
        }
        self.add(WishlistItem {
            added_at: Utc::now(),
            ..item
        })
    }

    /// Remove an item and hand it back for the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the wishlist cannot be written.
    #[instrument(skip(self))]
    pub fn move_to_cart(&self, id: &ProductId) -> Result<Option<WishlistItem>, StorageError> {
        self.take(id)
    }

    /// Remove every item.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the empty wishlist cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.save(&[])
    }

    fn take(&self, id: &ProductId) -> Result<Option<WishlistItem>, StorageError> {
        let mut items = self.items();
        let Some(pos) = items.iter().position(|item| &item.id == id) else {
            return Ok(None);
        };
        let removed = items.remove(pos);
        self.save(&items)?;
        Ok(Some(removed))
    }

    fn save(&self, items: &[WishlistItem]) -> Result<(), StorageError> {
        storage::write_json(self.storage.as_ref(), keys::WISHLIST, items)?;
        self.notifier.notify(StoreEvent::WishlistUpdated { count: items.len() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use lecas_core::Price;
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (WishlistStore, ChangeNotifier) {
        let notifier = ChangeNotifier::new();
        let wishlist = WishlistStore::new(Arc::new(MemoryStore::new()), notifier.clone());
        (wishlist, notifier)
    }

    fn bag(id: &str) -> WishlistItem {
        WishlistItem {
            id: ProductId::new(id),
            name: "Leather tote".to_string(),
            image: "/img/tote.jpg".to_string(),
            price: Price::new(Decimal::new(890, 0)),
            original_price: None,
            rating: Some(4.8),
            discount: None,
            added_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_toggle_alternates_presence() {
        let (wishlist, _) = store();
        let id = ProductId::new("tote");

        assert!(wishlist.toggle(bag("tote")).unwrap());
        assert!(wishlist.contains(&id));

        assert!(!wishlist.toggle(bag("tote")).unwrap());
        assert!(!wishlist.contains(&id));

        assert!(wishlist.toggle(bag("tote")).unwrap());
        assert!(wishlist.contains(&id));
        assert_eq!(wishlist.count(), 1);
    }

    #[test]
    fn test_toggle_stamps_added_at() {
        let (wishlist, _) = store();
        wishlist.toggle(bag("tote")).unwrap();

        let stored = &wishlist.items()[0];
        assert!(stored.added_at > Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_add_is_keyed_by_id() {
        let (wishlist, _) = store();
        assert!(wishlist.add(bag("a")).unwrap());
        assert!(!wishlist.add(bag("a")).unwrap());
        assert!(wishlist.add(bag("b")).unwrap());
        assert_eq!(wishlist.count(), 2);
    }

    #[test]
    fn test_move_to_cart_returns_record() {
        let (wishlist, _) = store();
        wishlist.add(bag("a")).unwrap();
        wishlist.add(bag("b")).unwrap();

        let moved = wishlist.move_to_cart(&ProductId::new("a")).unwrap().unwrap();
        assert_eq!(moved.id.as_str(), "a");
        assert_eq!(moved.rating, Some(4.8));
        assert!(!wishlist.contains(&ProductId::new("a")));

        assert!(wishlist.move_to_cart(&ProductId::new("a")).unwrap().is_none());
    }

    #[test]
    fn test_remove_and_clear_notify() {
        let (wishlist, notifier) = store();
        wishlist.add(bag("a")).unwrap();
        wishlist.add(bag("b")).unwrap();
        let mut rx = notifier.subscribe();

        assert!(wishlist.remove(&ProductId::new("a")).unwrap());
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::WishlistUpdated { count: 1 });

        wishlist.clear().unwrap();
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::WishlistUpdated { count: 0 });
        assert_eq!(wishlist.count(), 0);
    }
}
