//! Contact form submission.

use std::sync::Arc;

use tracing::instrument;

use crate::api::Transport;
use crate::api::types::{ContactRequest, ContactResponse};
use crate::error::Result;

/// Thin service over `POST /contact`.
pub struct ContactService<T> {
    transport: Arc<T>,
}

impl<T> Clone for ContactService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> ContactService<T> {
    pub(crate) fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Send a contact message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is
    /// rejected; validation failures carry the server's field errors.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn send(&self, request: &ContactRequest) -> Result<ContactResponse> {
        let value = self
            .transport
            .post("/contact", serde_json::to_value(request)?)
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
