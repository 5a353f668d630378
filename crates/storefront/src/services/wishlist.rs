//! Wishlist reconciliation engine.
//!
//! Same two-mode state machine as the cart, with a simpler payload:
//! entries carry no quantity and the local records are a set of product
//! ids. Adding a product already present is a no-op.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::instrument;

use clementine_core::{ItemId, Product, ProductId};

use crate::api::Transport;
use crate::api::types::{WishlistItemDto, WishlistItemRequest};
use crate::error::Result;
use crate::services::catalog::CatalogService;
use crate::storage::{KeyValueStore, StorageError, keys};

/// An entry of the in-memory wishlist.
#[derive(Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub id: ItemId,
    pub product: Product,
}

impl From<WishlistItemDto> for WishlistEntry {
    fn from(dto: WishlistItemDto) -> Self {
        Self {
            id: ItemId::Server(dto.id),
            product: dto.product,
        }
    }
}

/// The wishlist engine.
///
/// Cheaply cloneable via `Arc`.
pub struct WishlistService<T> {
    inner: Arc<WishlistInner<T>>,
}

impl<T> Clone for WishlistService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct WishlistInner<T> {
    transport: Arc<T>,
    storage: Arc<dyn KeyValueStore>,
    catalog: CatalogService<T>,
    auth: watch::Receiver<Option<SecretString>>,
    items: watch::Sender<Vec<WishlistEntry>>,
    /// Stable local entry ids, one per product, for the anonymous mode.
    local_ids: Mutex<HashMap<ProductId, u64>>,
    next_local_id: AtomicU64,
}

impl<T: Transport> WishlistService<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        storage: Arc<dyn KeyValueStore>,
        catalog: CatalogService<T>,
        auth: watch::Receiver<Option<SecretString>>,
    ) -> Self {
        Self {
            inner: Arc::new(WishlistInner {
                transport,
                storage,
                catalog,
                auth,
                items: watch::Sender::new(Vec::new()),
                local_ids: Mutex::new(HashMap::new()),
                next_local_id: AtomicU64::new(1),
            }),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.inner.auth.borrow().is_some()
    }

    /// Snapshot of the current wishlist.
    #[must_use]
    pub fn items(&self) -> Vec<WishlistEntry> {
        self.inner.items.borrow().clone()
    }

    /// Subscribe to wishlist changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<WishlistEntry>> {
        self.inner.items.subscribe()
    }

    /// Number of entries. Derived, never stored.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        u32::try_from(self.inner.items.borrow().len()).unwrap_or(u32::MAX)
    }

    /// Pure membership query over the current in-memory state.
    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        self.inner
            .items
            .borrow()
            .iter()
            .any(|entry| entry.product.id == product_id)
    }

    /// Load the wishlist for the current mode and publish it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Vec<WishlistEntry> {
        if self.is_authenticated() {
            match self.fetch_remote().await {
                Ok(entries) => {
                    self.inner.items.send_replace(entries.clone());
                    return entries;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "wishlist fetch failed, falling back to local records"
                    );
                }
            }
        }

        self.publish_local().await
    }

    /// Add a product; a product already present stays a single entry.
    ///
    /// Returns `None` when the product does not resolve in the catalog
    /// while anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write or local persistence fails.
    #[instrument(skip(self), fields(product = %product_id))]
    pub async fn add(&self, product_id: ProductId) -> Result<Option<WishlistEntry>> {
        if let Some(existing) = self
            .items()
            .into_iter()
            .find(|entry| entry.product.id == product_id)
        {
            return Ok(Some(existing));
        }

        if self.is_authenticated() {
            let request = WishlistItemRequest { product_id };
            let value = self
                .inner
                .transport
                .post("/wishlist/add", serde_json::to_value(&request)?)
                .await?;
            let dto: WishlistItemDto = serde_json::from_value(value)?;
            self.refresh().await;
            return Ok(Some(dto.into()));
        }

        let mut records = self.load_local();
        if !records.contains(&product_id) {
            records.push(product_id);
            self.save_local(&records)?;
        }

        let entries = self.publish_local().await;
        Ok(entries
            .into_iter()
            .find(|entry| entry.product.id == product_id))
    }

    /// Remove an entry. Removing an unknown entry is a no-op.
    ///
    /// The entry id alone is enough in both modes: anonymous entries
    /// resolve their product id from the in-memory state.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write or local persistence fails.
    #[instrument(skip(self), fields(entry = %entry_id))]
    pub async fn remove(&self, entry_id: ItemId) -> Result<()> {
        if self.is_authenticated() {
            let Some(server_id) = entry_id.server_id() else {
                return Ok(());
            };
            self.inner
                .transport
                .delete(&format!("/wishlist/{server_id}"))
                .await?;
            self.refresh().await;
            return Ok(());
        }

        let Some(entry) = self.items().into_iter().find(|entry| entry.id == entry_id) else {
            return Ok(());
        };

        let mut records = self.load_local();
        records.retain(|id| *id != entry.product.id);
        self.save_local(&records)?;
        self.publish_local().await;
        Ok(())
    }

    /// React to an authentication change, mirroring the cart engine.
    pub async fn on_auth_changed(&self, authenticated: bool) {
        if authenticated {
            self.sync_local_to_server().await;
        } else {
            self.publish_local().await;
        }
    }

    /// Merge local records into the server wishlist, once per login.
    ///
    /// Same contract as the cart merge: one request per product,
    /// concurrent and unordered, failures swallowed, then clear local
    /// storage and refresh for canonical ids.
    #[instrument(skip(self))]
    async fn sync_local_to_server(&self) {
        let records = self.load_local();
        if records.is_empty() {
            self.refresh().await;
            return;
        }

        let writes = records.iter().map(|product_id| {
            let transport = Arc::clone(&self.inner.transport);
            let request = WishlistItemRequest {
                product_id: *product_id,
            };
            async move {
                match serde_json::to_value(&request) {
                    Ok(body) => {
                        if let Err(e) = transport.post("/wishlist/add", body).await {
                            tracing::warn!(error = %e, "wishlist merge write failed");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "wishlist merge request not serializable");
                    }
                }
            }
        });
        join_all(writes).await;

        if let Err(e) = self.inner.storage.remove(keys::LOCAL_WISHLIST) {
            tracing::warn!(error = %e, "failed to clear local wishlist after merge");
        }
        self.refresh().await;
    }

    async fn fetch_remote(&self) -> std::result::Result<Vec<WishlistEntry>, crate::api::ApiError> {
        let value = self.inner.transport.get("/wishlist", &[]).await?;
        let dtos: Vec<WishlistItemDto> = serde_json::from_value(value)?;
        Ok(dtos.into_iter().map(WishlistEntry::from).collect())
    }

    async fn publish_local(&self) -> Vec<WishlistEntry> {
        let entries = self.rehydrate().await;
        self.inner.items.send_replace(entries.clone());
        entries
    }

    /// Rebuild entries from local records against the catalog; same
    /// blocking-dependency rule as the cart.
    async fn rehydrate(&self) -> Vec<WishlistEntry> {
        let records = self.load_local();
        if records.is_empty() {
            return Vec::new();
        }

        self.inner.catalog.ensure_loaded().await;
        let products = self.inner.catalog.current_products();

        records
            .iter()
            .filter_map(|product_id| {
                let product = products.iter().find(|p| p.id == *product_id)?;
                Some(WishlistEntry {
                    id: ItemId::Local(self.local_id_for(*product_id)),
                    product: product.clone(),
                })
            })
            .collect()
    }

    fn local_id_for(&self, product_id: ProductId) -> u64 {
        let mut ids = match self.inner.local_ids.lock() {
            Ok(ids) => ids,
            Err(poisoned) => poisoned.into_inner(),
        };
        *ids.entry(product_id)
            .or_insert_with(|| self.inner.next_local_id.fetch_add(1, Ordering::Relaxed))
    }

    fn load_local(&self) -> Vec<ProductId> {
        let raw = match self.inner.storage.get(keys::LOCAL_WISHLIST) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "local wishlist unreadable, treating as empty");
                return Vec::new();
            }
        };

        raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(error = %e, "local wishlist corrupt, treating as empty");
                None
            }
        })
        .unwrap_or_default()
    }

    fn save_local(&self, records: &[ProductId]) -> std::result::Result<(), StorageError> {
        let raw = serde_json::to_string(records)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.inner.storage.set(keys::LOCAL_WISHLIST, &raw)
    }
}
