//! Cart reconciliation engine.
//!
//! The cart runs a two-mode state machine driven by the session's
//! authenticated flag:
//!
//! - **Anonymous**: reads and writes target the local `localCart`
//!   records; in-memory lines are rehydrated by resolving record ids
//!   against the catalog cache.
//! - **Authenticated**: reads and writes target `/cart`; the server
//!   response is the authoritative state. A failed read degrades to the
//!   anonymous rehydration path instead of surfacing an error.
//!
//! The anonymous-to-authenticated transition merges local records into
//! the server exactly once per login: one `POST /cart/add` per distinct
//! product, issued concurrently and unordered with failures swallowed,
//! then local storage is cleared and the cart refreshes from the server
//! for canonical line ids.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::instrument;

use clementine_core::{ItemId, Product, ProductId, Quantity};

use crate::api::Transport;
use crate::api::types::{CartItemDto, CartItemRequest, UpdateQuantityRequest};
use crate::error::Result;
use crate::services::catalog::CatalogService;
use crate::storage::{KeyValueStore, StorageError, keys};

/// A line of the in-memory cart.
///
/// The product is a denormalized snapshot taken from the catalog
/// (anonymous) or the server response (authenticated).
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: ItemId,
    pub product: Product,
    pub quantity: u32,
}

impl From<CartItemDto> for CartLine {
    fn from(dto: CartItemDto) -> Self {
        Self {
            id: ItemId::Server(dto.id),
            product: dto.product,
            quantity: dto.quantity,
        }
    }
}

/// Persisted anonymous cart record; at most one per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalCartRecord {
    product_id: ProductId,
    quantity: u32,
}

/// The cart engine.
///
/// Cheaply cloneable via `Arc`. Operations are async and not serialized
/// against each other; concurrent callers race with last-write-wins
/// semantics.
pub struct CartService<T> {
    inner: Arc<CartInner<T>>,
}

impl<T> Clone for CartService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CartInner<T> {
    transport: Arc<T>,
    storage: Arc<dyn KeyValueStore>,
    catalog: CatalogService<T>,
    auth: watch::Receiver<Option<SecretString>>,
    items: watch::Sender<Vec<CartLine>>,
    /// Stable local line ids, one per product, for the anonymous mode.
    local_ids: Mutex<HashMap<ProductId, u64>>,
    next_local_id: AtomicU64,
}

impl<T: Transport> CartService<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        storage: Arc<dyn KeyValueStore>,
        catalog: CatalogService<T>,
        auth: watch::Receiver<Option<SecretString>>,
    ) -> Self {
        Self {
            inner: Arc::new(CartInner {
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

    /// Snapshot of the current cart lines.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.inner.items.borrow().clone()
    }

    /// Subscribe to cart changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartLine>> {
        self.inner.items.subscribe()
    }

    /// Total quantity across all lines. Derived, never stored.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.inner
            .items
            .borrow()
            .iter()
            .map(|line| line.quantity)
            .sum()
    }

    /// Load the cart for the current mode and publish it.
    ///
    /// Authenticated: `GET /cart`, falling back to local rehydration on
    /// failure. Anonymous: rehydrate from local records, fetching the
    /// catalog first if it is empty.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Vec<CartLine> {
        if self.is_authenticated() {
            match self.fetch_remote().await {
                Ok(lines) => {
                    self.inner.items.send_replace(lines.clone());
                    return lines;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cart fetch failed, falling back to local records");
                }
            }
        }

        self.publish_local().await
    }

    /// Add a product to the cart.
    ///
    /// Anonymous: upserts the local record (incrementing an existing
    /// quantity) and returns the rehydrated line, or `None` when the
    /// product does not resolve in the catalog. Authenticated: posts to
    /// the server and refreshes the full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write or local persistence fails.
    #[instrument(skip(self), fields(product = %product_id, quantity = %quantity))]
    pub async fn add(&self, product_id: ProductId, quantity: Quantity) -> Result<Option<CartLine>> {
        if self.is_authenticated() {
            let request = CartItemRequest {
                product_id,
                quantity: quantity.get(),
            };
            let value = self
                .inner
                .transport
                .post("/cart/add", serde_json::to_value(&request)?)
                .await?;
            let dto: CartItemDto = serde_json::from_value(value)?;
            self.refresh().await;
            return Ok(Some(dto.into()));
        }

        let mut records = self.load_local();
        match records
            .iter()
            .position(|record| record.product_id == product_id)
        {
            Some(index) => {
                if let Some(record) = records.get_mut(index) {
                    record.quantity += quantity.get();
                }
            }
            None => records.push(LocalCartRecord {
                product_id,
                quantity: quantity.get(),
            }),
        }
        self.save_local(&records)?;

        let lines = self.publish_local().await;
        Ok(lines
            .into_iter()
            .find(|line| line.product.id == product_id))
    }

    /// Set the quantity of an existing line.
    ///
    /// Returns `None` when the line is unknown, including a local id
    /// presented while authenticated.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write or local persistence fails.
    #[instrument(skip(self), fields(line = %line_id, quantity = %quantity))]
    pub async fn update_quantity(
        &self,
        line_id: ItemId,
        quantity: Quantity,
    ) -> Result<Option<CartLine>> {
        if self.is_authenticated() {
            let Some(server_id) = line_id.server_id() else {
                return Ok(None);
            };
            let request = UpdateQuantityRequest {
                quantity: quantity.get(),
            };
            self.inner
                .transport
                .patch(&format!("/cart/{server_id}"), serde_json::to_value(&request)?)
                .await?;
            let lines = self.refresh().await;
            return Ok(lines.into_iter().find(|line| line.id == line_id));
        }

        let Some(line) = self.items().into_iter().find(|line| line.id == line_id) else {
            return Ok(None);
        };

        let mut records = self.load_local();
        if let Some(record) = records
            .iter_mut()
            .find(|record| record.product_id == line.product.id)
        {
            record.quantity = quantity.get();
            self.save_local(&records)?;
        }

        let lines = self.publish_local().await;
        Ok(lines
            .into_iter()
            .find(|updated| updated.product.id == line.product.id))
    }

    /// Remove a line. Removing an unknown line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write or local persistence fails.
    #[instrument(skip(self), fields(line = %line_id))]
    pub async fn remove(&self, line_id: ItemId) -> Result<()> {
        if self.is_authenticated() {
            let Some(server_id) = line_id.server_id() else {
                return Ok(());
            };
            self.inner
                .transport
                .delete(&format!("/cart/{server_id}"))
                .await?;
            self.refresh().await;
            return Ok(());
        }

        let Some(line) = self.items().into_iter().find(|line| line.id == line_id) else {
            return Ok(());
        };

        let mut records = self.load_local();
        records.retain(|record| record.product_id != line.product.id);
        self.save_local(&records)?;
        self.publish_local().await;
        Ok(())
    }

    /// Empty the cart in both modes; stale local records are erased
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote write or local persistence fails.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        if self.is_authenticated() {
            self.inner.transport.delete("/cart").await?;
        }

        self.inner.storage.remove(keys::LOCAL_CART)?;
        self.inner.items.send_replace(Vec::new());
        Ok(())
    }

    /// React to an authentication change.
    ///
    /// Login merges local records into the server; logout resumes
    /// anonymous mode from whatever local records remain (typically
    /// none, since the merge cleared them).
    pub async fn on_auth_changed(&self, authenticated: bool) {
        if authenticated {
            self.sync_local_to_server().await;
        } else {
            self.publish_local().await;
        }
    }

    /// Merge local records into the server cart, once per login.
    ///
    /// One request per distinct product, issued concurrently and
    /// unordered; write failures are logged and swallowed. All writes
    /// are awaited before local storage is cleared and the cart is
    /// refreshed for canonical server ids.
    #[instrument(skip(self))]
    async fn sync_local_to_server(&self) {
        let records = self.load_local();
        if records.is_empty() {
            self.refresh().await;
            return;
        }

        let writes = records.iter().map(|record| {
            let transport = Arc::clone(&self.inner.transport);
            let request = CartItemRequest {
                product_id: record.product_id,
                quantity: record.quantity,
            };
            async move {
                match serde_json::to_value(&request) {
                    Ok(body) => {
                        if let Err(e) = transport.post("/cart/add", body).await {
                            tracing::warn!(error = %e, "cart merge write failed");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "cart merge request not serializable"),
                }
            }
        });
        join_all(writes).await;

        if let Err(e) = self.inner.storage.remove(keys::LOCAL_CART) {
            tracing::warn!(error = %e, "failed to clear local cart after merge");
        }
        self.refresh().await;
    }

    async fn fetch_remote(&self) -> std::result::Result<Vec<CartLine>, crate::api::ApiError> {
        let value = self.inner.transport.get("/cart", &[]).await?;
        let dtos: Vec<CartItemDto> = serde_json::from_value(value)?;
        Ok(dtos.into_iter().map(CartLine::from).collect())
    }

    /// Rehydrate lines from local records and publish them.
    async fn publish_local(&self) -> Vec<CartLine> {
        let lines = self.rehydrate().await;
        self.inner.items.send_replace(lines.clone());
        lines
    }

    /// Rebuild lines from local records against the catalog.
    ///
    /// Must not run against an empty catalog: when nothing is loaded
    /// yet, the catalog is fetched first and rehydration waits for it.
    /// Records whose product no longer resolves are dropped.
    async fn rehydrate(&self) -> Vec<CartLine> {
        let records = self.load_local();
        if records.is_empty() {
            return Vec::new();
        }

        self.inner.catalog.ensure_loaded().await;
        let products = self.inner.catalog.current_products();

        records
            .iter()
            .filter_map(|record| {
                let product = products.iter().find(|p| p.id == record.product_id)?;
                Some(CartLine {
                    id: ItemId::Local(self.local_id_for(record.product_id)),
                    product: product.clone(),
                    quantity: record.quantity,
                })
            })
            .collect()
    }

    /// The stable local id for a product, assigned on first use.
    fn local_id_for(&self, product_id: ProductId) -> u64 {
        let mut ids = match self.inner.local_ids.lock() {
            Ok(ids) => ids,
            Err(poisoned) => poisoned.into_inner(),
        };
        *ids.entry(product_id)
            .or_insert_with(|| self.inner.next_local_id.fetch_add(1, Ordering::Relaxed))
    }

    fn load_local(&self) -> Vec<LocalCartRecord> {
        let raw = match self.inner.storage.get(keys::LOCAL_CART) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "local cart unreadable, treating as empty");
                return Vec::new();
            }
        };

        raw.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(error = %e, "local cart corrupt, treating as empty");
                None
            }
        })
        .unwrap_or_default()
    }

    fn save_local(&self, records: &[LocalCartRecord]) -> std::result::Result<(), StorageError> {
        let raw = serde_json::to_string(records)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        self.inner.storage.set(keys::LOCAL_CART, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::testing::{FakeTransport, cart_item_json, product_json};
    use serde_json::json;

    struct Harness {
        transport: Arc<FakeTransport>,
        storage: Arc<MemoryStore>,
        auth: watch::Sender<Option<SecretString>>,
        catalog: CatalogService<FakeTransport>,
        cart: CartService<FakeTransport>,
    }

    fn harness() -> Harness {
        let transport = Arc::new(FakeTransport::new());
        let storage = Arc::new(MemoryStore::new());
        let (auth, auth_rx) = watch::channel(None);
        let catalog = CatalogService::new(Arc::clone(&transport));
        let cart = CartService::new(
            Arc::clone(&transport),
            Arc::clone(&storage) as Arc<dyn KeyValueStore>,
            catalog.clone(),
            auth_rx,
        );

        // Default catalog: products 5, 7 and 9 exist
        transport.respond(
            "GET",
            "/products",
            json!([product_json(5), product_json(7), product_json(9)]),
        );

        Harness {
            transport,
            storage,
            auth,
            catalog,
            cart,
        }
    }

    fn log_in(harness: &Harness) {
        harness
            .auth
            .send_replace(Some(SecretString::from("token")));
    }

    #[tokio::test]
    async fn anonymous_add_counts_sum_of_quantities() {
        let h = harness();

        h.cart.add(ProductId::new(5), Quantity::new(2)).await.unwrap();
        h.cart.add(ProductId::new(7), Quantity::new(1)).await.unwrap();

        assert_eq!(h.cart.item_count(), 3);
        assert_eq!(h.cart.items().len(), 2);
        // Nothing went to the server
        assert!(h.transport.requests_to("POST", "/cart/add").is_empty());
        // Records landed in storage
        let raw = h.storage.get(keys::LOCAL_CART).unwrap().unwrap();
        let records: Vec<LocalCartRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn anonymous_add_upserts_per_product() {
        let h = harness();

        let first = h
            .cart
            .add(ProductId::new(5), Quantity::new(1))
            .await
            .unwrap()
            .unwrap();
        let second = h
            .cart
            .add(ProductId::new(5), Quantity::new(2))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(second.quantity, 3);
        assert_eq!(second.id, first.id, "local line ids are stable per product");
        assert_eq!(h.cart.items().len(), 1);
        assert_eq!(h.cart.item_count(), 3);
    }

    #[tokio::test]
    async fn anonymous_add_of_unknown_product_returns_none() {
        let h = harness();

        let line = h.cart.add(ProductId::new(999), Quantity::ONE).await.unwrap();

        assert!(line.is_none());
        // The record exists but does not resolve, so it contributes nothing
        assert_eq!(h.cart.item_count(), 0);
    }

    #[tokio::test]
    async fn rehydration_waits_for_catalog_fetch() {
        let h = harness();
        // Seed a record without going through add(), so the catalog is
        // still empty when refresh() runs.
        h.storage
            .set(keys::LOCAL_CART, r#"[{"productId":5,"quantity":2}]"#)
            .unwrap();
        assert!(h.catalog.current_products().is_empty());

        let lines = h.cart.refresh().await;

        assert_eq!(h.transport.requests_to("GET", "/products").len(), 1);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn records_for_vanished_products_are_dropped() {
        let h = harness();
        h.storage
            .set(
                keys::LOCAL_CART,
                r#"[{"productId":5,"quantity":2},{"productId":404,"quantity":9}]"#,
            )
            .unwrap();

        let lines = h.cart.refresh().await;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.id, ProductId::new(5));
        assert_eq!(h.cart.item_count(), 2);
    }

    #[tokio::test]
    async fn round_trip_through_storage_rebuilds_the_same_cart() {
        let h = harness();
        h.cart.add(ProductId::new(5), Quantity::new(2)).await.unwrap();
        h.cart.add(ProductId::new(7), Quantity::new(4)).await.unwrap();

        // A fresh engine over the same storage and catalog
        let (_auth, auth_rx) = watch::channel(None);
        let rebuilt = CartService::new(
            Arc::clone(&h.transport),
            Arc::clone(&h.storage) as Arc<dyn KeyValueStore>,
            h.catalog.clone(),
            auth_rx,
        );
        let lines = rebuilt.refresh().await;

        let mut pairs: Vec<(ProductId, u32)> = lines
            .iter()
            .map(|line| (line.product.id, line.quantity))
            .collect();
        pairs.sort_by_key(|(id, _)| id.as_i64());
        assert_eq!(
            pairs,
            vec![(ProductId::new(5), 2), (ProductId::new(7), 4)]
        );
        assert_eq!(rebuilt.item_count(), h.cart.item_count());
    }

    #[tokio::test]
    async fn update_quantity_coerces_to_at_least_one() {
        let h = harness();
        let line = h
            .cart
            .add(ProductId::new(5), Quantity::new(3))
            .await
            .unwrap()
            .unwrap();

        // Simulates a blank/garbage form field
        let updated = h
            .cart
            .update_quantity(line.id, Quantity::coerce(None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 1);

        let updated = h
            .cart
            .update_quantity(line.id, Quantity::coerce(Some(-2)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.quantity, 1);
    }

    #[tokio::test]
    async fn update_of_unknown_line_returns_none() {
        let h = harness();
        let result = h
            .cart
            .update_quantity(ItemId::Local(42), Quantity::ONE)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn anonymous_remove_drops_the_record() {
        let h = harness();
        let line = h
            .cart
            .add(ProductId::new(5), Quantity::new(2))
            .await
            .unwrap()
            .unwrap();
        h.cart.add(ProductId::new(7), Quantity::ONE).await.unwrap();

        h.cart.remove(line.id).await.unwrap();

        assert_eq!(h.cart.items().len(), 1);
        assert_eq!(h.cart.item_count(), 1);
        let raw = h.storage.get(keys::LOCAL_CART).unwrap().unwrap();
        assert!(!raw.contains("\"productId\":5"));
    }

    #[tokio::test]
    async fn clear_erases_records_and_state() {
        let h = harness();
        h.cart.add(ProductId::new(5), Quantity::new(2)).await.unwrap();

        h.cart.clear().await.unwrap();

        assert!(h.cart.items().is_empty());
        assert_eq!(h.storage.get(keys::LOCAL_CART).unwrap(), None);
    }

    #[tokio::test]
    async fn login_merge_issues_one_add_per_distinct_product() {
        let h = harness();
        h.cart.add(ProductId::new(5), Quantity::new(2)).await.unwrap();
        h.cart.add(ProductId::new(7), Quantity::new(1)).await.unwrap();

        // Server state after the merge settles
        h.transport.respond(
            "GET",
            "/cart",
            json!([cart_item_json(201, 5, 2), cart_item_json(202, 7, 1)]),
        );

        log_in(&h);
        h.cart.on_auth_changed(true).await;

        let adds = h.transport.requests_to("POST", "/cart/add");
        assert_eq!(adds.len(), 2, "exactly one add per distinct product");
        let mut bodies: Vec<serde_json::Value> =
            adds.iter().map(|r| r.body.clone().unwrap()).collect();
        bodies.sort_by_key(|b| b["productId"].as_i64());
        assert_eq!(bodies[0], json!({"productId": 5, "quantity": 2}));
        assert_eq!(bodies[1], json!({"productId": 7, "quantity": 1}));

        // Local records cleared, server ids adopted
        assert_eq!(h.storage.get(keys::LOCAL_CART).unwrap(), None);
        let items = h.cart.items();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|line| !line.id.is_local()));
        assert_eq!(h.cart.item_count(), 3);
    }

    #[tokio::test]
    async fn login_merge_survives_failing_writes() {
        let h = harness();
        h.cart.add(ProductId::new(5), Quantity::new(2)).await.unwrap();
        h.transport.fail("POST", "/cart/add");
        h.transport.respond("GET", "/cart", json!([]));

        log_in(&h);
        h.cart.on_auth_changed(true).await;

        // The failed write is swallowed; local records are still cleared
        // and the refresh still ran.
        assert_eq!(h.storage.get(keys::LOCAL_CART).unwrap(), None);
        assert_eq!(h.transport.requests_to("GET", "/cart").len(), 1);
        assert!(h.cart.items().is_empty());
    }

    #[tokio::test]
    async fn login_without_local_records_skips_straight_to_refresh() {
        let h = harness();
        h.transport
            .respond("GET", "/cart", json!([cart_item_json(300, 9, 4)]));

        log_in(&h);
        h.cart.on_auth_changed(true).await;

        assert!(h.transport.requests_to("POST", "/cart/add").is_empty());
        assert_eq!(h.cart.item_count(), 4);
    }

    #[tokio::test]
    async fn authenticated_read_failure_degrades_to_local() {
        let h = harness();
        h.storage
            .set(keys::LOCAL_CART, r#"[{"productId":9,"quantity":3}]"#)
            .unwrap();
        h.transport.fail("GET", "/cart");
        log_in(&h);

        let lines = h.cart.refresh().await;

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product.id, ProductId::new(9));
        assert!(lines[0].id.is_local());
    }

    #[tokio::test]
    async fn authenticated_add_posts_then_refreshes() {
        let h = harness();
        log_in(&h);
        h.transport
            .respond("POST", "/cart/add", cart_item_json(501, 5, 2));
        h.transport
            .respond("GET", "/cart", json!([cart_item_json(501, 5, 2)]));

        let line = h
            .cart
            .add(ProductId::new(5), Quantity::new(2))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(line.id, ItemId::Server(501));
        assert_eq!(h.transport.requests_to("GET", "/cart").len(), 1);
        assert_eq!(h.cart.item_count(), 2);
    }

    #[tokio::test]
    async fn authenticated_update_patches_by_server_id() {
        let h = harness();
        log_in(&h);
        h.transport
            .respond("GET", "/cart", json!([cart_item_json(501, 5, 6)]));

        let updated = h
            .cart
            .update_quantity(ItemId::Server(501), Quantity::new(6))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.quantity, 6);
        assert_eq!(h.transport.requests_to("PATCH", "/cart/501").len(), 1);
    }

    #[tokio::test]
    async fn authenticated_update_of_local_id_is_a_no_op() {
        let h = harness();
        log_in(&h);

        let result = h
            .cart
            .update_quantity(ItemId::Local(1), Quantity::new(2))
            .await
            .unwrap();

        assert!(result.is_none());
        assert!(h.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn authenticated_clear_deletes_remotely_and_erases_stale_records() {
        let h = harness();
        h.storage
            .set(keys::LOCAL_CART, r#"[{"productId":5,"quantity":1}]"#)
            .unwrap();
        log_in(&h);

        h.cart.clear().await.unwrap();

        assert_eq!(h.transport.requests_to("DELETE", "/cart").len(), 1);
        assert_eq!(h.storage.get(keys::LOCAL_CART).unwrap(), None);
        assert!(h.cart.items().is_empty());
    }

    #[tokio::test]
    async fn logout_resumes_anonymous_mode() {
        let h = harness();
        h.transport
            .respond("GET", "/cart", json!([cart_item_json(501, 5, 2)]));
        log_in(&h);
        h.cart.on_auth_changed(true).await;
        assert_eq!(h.cart.item_count(), 2);

        h.auth.send_replace(None);
        h.cart.on_auth_changed(false).await;

        // Local records were cleared by the merge, so the cart is empty
        assert!(h.cart.items().is_empty());
        assert_eq!(h.cart.item_count(), 0);
    }

    #[tokio::test]
    async fn corrupt_local_records_are_treated_as_empty() {
        let h = harness();
        h.storage.set(keys::LOCAL_CART, "not json").unwrap();

        let lines = h.cart.refresh().await;

        assert!(lines.is_empty());
    }
}
