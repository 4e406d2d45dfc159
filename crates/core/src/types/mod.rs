//! Core types for Lecas.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod status;
pub mod user;
pub mod wishlist;

pub use cart::{CartItem, LineKey};
pub use id::*;
pub use price::Price;
pub use status::*;
pub use user::{StoredUser, UserRole};
pub use wishlist::WishlistItem;
