//! Lecas Storefront - client-side shopping state.
//!
//! This crate owns everything the storefront keeps on the customer's device:
//!
//! - [`cart`] - line items with stock-aware merging
//! - [`wishlist`] - favorited products with move-to-cart
//! - [`session`] - bearer and refresh credentials plus the signed-in user
//! - [`refresh`] - background task that swaps expiring bearer tokens
//!
//! # Architecture
//!
//! Every store reads and writes through a [`storage::KeyValueStore`], so the
//! same logic runs over an in-memory map in tests and a JSON state file in
//! the CLI. Mutations persist the whole record list and then publish a
//! [`events::StoreEvent`] on a shared [`events::ChangeNotifier`], which lets
//! any observer resynchronize badge counts.
//!
//! The backend is reached only through [`api::ApiClient`], a thin JSON REST
//! client. Business rules live server-side.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod refresh;
pub mod session;
pub mod storage;
pub mod token;
pub mod wishlist;

pub use api::{ApiClient, ApiError};
pub use cart::CartStore;
pub use config::{ClientConfig, ConfigError};
pub use error::{Error, Result};
pub use events::{ChangeNotifier, StoreEvent};
pub use refresh::{
    RefreshHandle, RefreshOutcome, SchedulerError, TokenRefreshScheduler, TokenRefresher,
};
pub use session::SessionStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use wishlist::WishlistStore;
