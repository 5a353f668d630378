//! Unified error handling.
//!
//! Each layer has its own error enum (`ApiError`, `StorageError`,
//! `ConfigError`); `ShopError` is the union the service methods return.
//! Nothing here is fatal to the process: read failures degrade to local
//! state inside the services and never reach callers as hard errors.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum ShopError {
    /// Remote API operation failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Local key-value storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration loading failed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        Self::Api(ApiError::Parse(err))
    }
}

/// Result type alias for `ShopError`.
pub type Result<T> = std::result::Result<T, ShopError>;
