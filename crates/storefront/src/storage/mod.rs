//! Key-value persistence for client state.
//!
//! The storefront treats its device storage as a flat string-to-string map,
//! the same shape as browser local storage. Records are stored as JSON text
//! under the well-known [`keys`].
//!
//! Reads are forgiving: a missing key, an unreadable store or a value that no
//! longer parses all come back as the record's default (an empty cart, no
//! user). Writes propagate their errors.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys shared with the web storefront.
pub mod keys {
    /// JSON array of cart line items.
    pub const CART: &str = "lecas_cart";

    /// JSON array of wishlist items.
    pub const WISHLIST: &str = "lecas_wishlist";

    /// Bearer credential for API calls.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// Credential exchanged for a new bearer token.
    pub const REFRESH_TOKEN: &str = "refresh_token";

    /// JSON profile of the signed-in user.
    pub const USER: &str = "user";
}

/// Errors from the underlying key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backing file exists but is not a JSON object of strings.
    #[error("Corrupt state file {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// A previous holder of the store lock panicked.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A synchronous string key-value store.
///
/// Each call is atomic on its own; read-modify-write sequences built on top
/// are not, and concurrent writers resolve as last-writer-wins.
///
/// Calls are synchronous, including from async code such as the refresh
/// scheduler, so implementations must stay cheap: a small local file or an
/// in-memory map. Do not put network-backed stores behind this trait.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and parse the JSON record under `key`.
///
/// Falls back to `T::default()` when the key is missing or the stored value
/// cannot be read or parsed.
pub fn read_json<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored record, using empty state");
            return T::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Stored record is not valid JSON, using empty state");
        T::default()
    })
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the write fails.
pub fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
