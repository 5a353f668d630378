//! HTTP implementation of the transport seam.

use std::future::Future;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::watch;
use tracing::instrument;

use crate::api::{ApiError, FieldError, Transport};
use crate::config::ShopConfig;

/// Client for the shop API.
///
/// Cheaply cloneable via `Arc`. Watches the session's credential
/// channel and attaches a bearer header whenever a token is present.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

struct HttpClientInner {
    client: reqwest::Client,
    base: String,
    token: watch::Receiver<Option<SecretString>>,
}

impl HttpClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: &ShopConfig,
        token: watch::Receiver<Option<SecretString>>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpClientInner {
                client,
                base: config.api_base(),
                token,
            }),
        })
    }

    /// Execute a request and decode the response body.
    ///
    /// The body is read as text first so failures can be diagnosed from
    /// the raw payload; an empty body decodes to `Value::Null`.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.inner.base);

        let mut request = self.inner.client.request(method, &url);

        if !query.is_empty() {
            request = request.query(query);
        }

        let token = self.inner.token.borrow().clone();
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(error_for_status(status, path, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "failed to parse shop API response"
            );
            ApiError::Parse(e)
        })?;

        Ok(value)
    }
}

/// Map a non-success response to an `ApiError`.
///
/// 400 bodies carrying the server's field-error map become
/// [`ApiError::Validation`] with one entry per field.
fn error_for_status(status: StatusCode, path: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        StatusCode::BAD_REQUEST => parse_field_errors(body).map_or_else(
            || ApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            },
            ApiError::Validation,
        ),
        _ => ApiError::Status {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        },
    }
}

/// Extract the `errors` field-message map from a 400 body, if present.
fn parse_field_errors(body: &str) -> Option<Vec<FieldError>> {
    let value: Value = serde_json::from_str(body).ok()?;
    let map = value.get("errors")?.as_object()?;

    let mut errors: Vec<FieldError> = map
        .iter()
        .map(|(field, message)| FieldError {
            field: field.clone(),
            message: message.as_str().unwrap_or_default().to_string(),
        })
        .collect();
    errors.sort_by(|a, b| a.field.cmp(&b.field));

    Some(errors)
}

impl Transport for HttpClient {
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        self.execute(Method::GET, path, query, None)
    }

    fn post(&self, path: &str, body: Value) -> impl Future<Output = Result<Value, ApiError>> + Send {
        self.execute(Method::POST, path, &[], Some(body))
    }

    fn patch(
        &self,
        path: &str,
        body: Value,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        self.execute(Method::PATCH, path, &[], Some(body))
    }

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        let fut = self.execute(Method::DELETE, path, &[], None);
        async move {
            fut.await?;
            Ok(())
        }
    }
}
