//! Durable local key-value storage.
//!
//! The anonymous cart/wishlist records and the session credential live
//! here under fixed keys. Access is synchronous and unscoped: no
//! transactions, no locking across processes, last write wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Fixed storage keys.
pub mod keys {
    /// The bearer credential.
    pub const TOKEN: &str = "token";
    /// Anonymous cart records: a JSON array of `{productId, quantity}`.
    pub const LOCAL_CART: &str = "localCart";
    /// Anonymous wishlist records: a JSON array of product ids.
    pub const LOCAL_WISHLIST: &str = "localWishlist";
}

/// Errors from the key-value layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt storage file: {0}")]
    Corrupt(String),

    /// A previous panic left the in-process lock poisoned.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A durable string-to-string store.
///
/// Implementations must be safe to share across tasks; the engines
/// treat the store as a simple resource and do not serialize their own
/// accesses against each other.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`; removing an absent key is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
