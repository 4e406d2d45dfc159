//! Lecas Core - Shared types library.
//!
//! This crate provides common types used across all Lecas client components:
//! - `storefront` - Cart, wishlist and session state with the token refresh task
//! - `cli` - Command-line front end over a persisted state file
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product ids, prices, cart and wishlist records, order statuses
//!   and the stored user record

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
