//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CLEMENTINE_API_URL` - Base URL of the shop API
//!   (default: `http://localhost:8080/api`)
//! - `CLEMENTINE_STORAGE` - Path of the JSON key-value store file; when
//!   unset, state is kept in memory and lost on exit
//! - `CLEMENTINE_HTTP_TIMEOUT_SECS` - Request timeout in seconds
//!   (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Base URL of the shop API, without a trailing slash.
    pub api_url: Url,
    /// Path of the durable key-value store file; `None` keeps state in
    /// memory only.
    pub storage_path: Option<PathBuf>,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = get_env_or_default("CLEMENTINE_API_URL", DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEMENTINE_API_URL".to_string(), e.to_string())
            })?;

        let storage_path = get_optional_env("CLEMENTINE_STORAGE").map(PathBuf::from);

        let timeout_secs = get_env_or_default(
            "CLEMENTINE_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("CLEMENTINE_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            storage_path,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Build a configuration for a given API base URL with defaults for
    /// everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        let api_url = api_url.parse::<Url>().map_err(|e| {
            ConfigError::InvalidEnvVar("CLEMENTINE_API_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_url,
            storage_path: None,
            request_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    /// The API base as a string without a trailing slash, ready for
    /// path concatenation.
    #[must_use]
    pub fn api_base(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_string()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
