//! CLI subcommand implementations.

pub mod cart;
pub mod order;
pub mod session;
pub mod wishlist;

use std::sync::Arc;

use lecas_storefront::{
    CartStore, ChangeNotifier, ClientConfig, FileStore, KeyValueStore, SessionStore,
    WishlistStore,
};

/// Stores opened over the configured state file.
pub struct App {
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub session: SessionStore,
    pub notifier: ChangeNotifier,
}

impl App {
    /// Open all stores over the state file named in `config`.
    pub fn open(config: &ClientConfig) -> Self {
        tracing::debug!(path = %config.state_path.display(), "Opening state file");
        Self::with_storage(Arc::new(FileStore::new(&config.state_path)))
    }

    /// Open all stores over an existing key-value store.
    pub fn with_storage(storage: Arc<dyn KeyValueStore>) -> Self {
        let notifier = ChangeNotifier::new();
        Self {
            cart: CartStore::new(storage.clone(), notifier.clone()),
            wishlist: WishlistStore::new(storage.clone(), notifier.clone()),
            session: SessionStore::new(storage, notifier.clone()),
            notifier,
        }
    }
}
