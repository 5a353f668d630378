//! Shop API transport.
//!
//! # Architecture
//!
//! - [`Transport`] is the seam the services are written against: the
//!   four JSON verbs the shop API uses, addressed by path relative to
//!   the configured base URL
//! - [`HttpClient`] is the production implementation over `reqwest`; it
//!   attaches `Authorization: Bearer <token>` whenever the session holds
//!   a credential
//! - [`types`] holds the wire structs (camelCase JSON, matching the
//!   remote API)
//!
//! # Example
//!
//! ```rust,ignore
//! use clementine_storefront::api::{HttpClient, Transport};
//!
//! let client = HttpClient::new(&config, token_rx)?;
//! let cart = client.get("/cart", &[]).await?;
//! ```

mod client;
pub mod types;

pub use client::HttpClient;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed below the protocol level.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport could not be reached at all. Used by non-HTTP
    /// implementations; semantically equivalent to [`ApiError::Http`].
    #[error("transport unavailable: {0}")]
    Unavailable(String),

    /// The server answered with an unexpected status code.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The credential was missing or rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the payload; one entry per offending field.
    #[error("validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// JSON (de)serialization failed.
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single field rejection from a validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

fn format_field_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "(no field details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// The shop API transport seam.
///
/// Paths are relative to the configured base (`/cart`, `/products/7`).
/// `get` and mutation responses are decoded JSON values; `delete`
/// endpoints answer `204 No Content`.
pub trait Transport: Send + Sync + 'static {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn post(&self, path: &str, body: Value) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn patch(&self, path: &str, body: Value)
    -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = ApiError::NotFound("/products/9".to_string());
        assert_eq!(err.to_string(), "not found: /products/9");

        let err = ApiError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 502: bad gateway");
    }

    #[test]
    fn validation_error_lists_fields() {
        let err = ApiError::Validation(vec![
            FieldError {
                field: "code".to_string(),
                message: "must not be blank".to_string(),
            },
            FieldError {
                field: "price".to_string(),
                message: "must be positive".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: code: must not be blank; price: must be positive"
        );
    }

    #[test]
    fn validation_error_without_fields() {
        let err = ApiError::Validation(vec![]);
        assert_eq!(
            err.to_string(),
            "validation failed: (no field details provided)"
        );
    }
}
