//! Authentication session.
//!
//! Holds the bearer credential and exposes the authenticated flag as a
//! watch channel. The cart and wishlist engines subscribe to that
//! channel; flipping it is what triggers their mode transitions.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::watch;
use tracing::instrument;

use crate::api::Transport;
use crate::api::types::{LoginRequest, LoginResponse, RegisterRequest};
use crate::error::Result;
use crate::storage::{KeyValueStore, StorageError, keys};

/// The authentication session.
///
/// Cheaply cloneable via `Arc`. A token already present in storage at
/// construction time restores the authenticated state.
pub struct Session<T> {
    inner: Arc<SessionInner<T>>,
}

impl<T> Clone for Session<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct SessionInner<T> {
    transport: Arc<T>,
    storage: Arc<dyn KeyValueStore>,
    auth: watch::Sender<Option<SecretString>>,
}

impl<T: Transport> Session<T> {
    /// Create a session over the given collaborators.
    ///
    /// The `auth` sender is created by the owning container so that the
    /// transport and the engines can hold receivers of the same channel.
    pub(crate) fn new(
        transport: Arc<T>,
        storage: Arc<dyn KeyValueStore>,
        auth: watch::Sender<Option<SecretString>>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                transport,
                storage,
                auth,
            }),
        }
    }

    /// Whether a credential is currently held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.auth.borrow().is_some()
    }

    /// Subscribe to credential changes.
    ///
    /// The engines register on this channel; each change of the
    /// authenticated flag triggers their mode transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<SecretString>> {
        self.inner.auth.subscribe()
    }

    /// The current user's email, decoded from the credential payload.
    ///
    /// The signature is NOT verified; this is display-only and never a
    /// security boundary. A missing or malformed payload yields `None`.
    #[must_use]
    pub fn current_user_email(&self) -> Option<String> {
        let token = self.inner.auth.borrow().clone()?;
        decode_subject(token.expose_secret())
    }

    /// Create a new account via `POST /account`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is rejected.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.inner
            .transport
            .post("/account", serde_json::to_value(request)?)
            .await?;
        Ok(())
    }

    /// Exchange credentials for a token via `POST /token`.
    ///
    /// On success the token is stored durably and the authenticated
    /// flag flips to true, which starts the engines' local-to-server
    /// merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token cannot be
    /// stored.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<()> {
        let value = self
            .inner
            .transport
            .post("/token", serde_json::to_value(request)?)
            .await?;
        let response: LoginResponse = serde_json::from_value(value)?;

        self.inner.storage.set(keys::TOKEN, &response.token)?;
        self.inner
            .auth
            .send_replace(Some(SecretString::from(response.token)));

        tracing::info!("session authenticated");
        Ok(())
    }

    /// Drop the credential.
    ///
    /// Synchronous and purely local: no network round-trip is required
    /// for logout to complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored token cannot be removed.
    pub fn logout(&self) -> std::result::Result<(), StorageError> {
        self.inner.storage.remove(keys::TOKEN)?;
        self.inner.auth.send_replace(None);
        tracing::info!("session cleared");
        Ok(())
    }
}

/// Decode the `sub` claim from a JWT-shaped token without verifying it.
fn decode_subject(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("sub")?.as_str().map(ToOwned::to_owned)
}
