//! Product catalog cache and product administration.
//!
//! Holds the last-fetched page of products in memory; the cart and
//! wishlist engines resolve product ids against it when rehydrating
//! anonymous state. Unfiltered reads are cached for 5 minutes; a fetch
//! that cannot reach the server serves a bundled dataset instead of
//! propagating the error, so the catalog is never empty after the first
//! fetch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use moka::future::Cache;
use tokio::sync::watch;
use tracing::{debug, instrument};

use clementine_core::{Category, PageResponse, Product, ProductId};

use crate::api::types::{ProductRequest, ProductsResponse};
use crate::api::{ApiError, Transport};
use crate::error::Result;

/// Products served when the catalog endpoint is unreachable.
const DEFAULT_CATALOG: &str = include_str!("../data/default_catalog.json");

const CACHE_CAPACITY: u64 = 100;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Sort direction for catalog queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl core::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Asc => f.write_str("ASC"),
            Self::Desc => f.write_str("DESC"),
        }
    }
}

/// Query parameters of `GET /products`. All fields optional; the
/// default filter asks for the server's unpaginated list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Zero-indexed page number.
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDirection>,
    pub category: Option<Category>,
    /// Free-text search.
    pub search: Option<String>,
}

impl ProductFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.size {
            query.push(("size", size.to_string()));
        }
        if let Some(sort_by) = &self.sort_by {
            query.push(("sortBy", sort_by.clone()));
        }
        if let Some(sort_dir) = self.sort_dir {
            query.push(("sortDir", sort_dir.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        query
    }

    /// Cache key for this filter; search results are never cached.
    fn cache_key(&self) -> Option<String> {
        if self.search.is_some() {
            return None;
        }
        Some(format!(
            "products:{:?}:{:?}:{:?}:{:?}:{:?}",
            self.page, self.size, self.sort_by, self.sort_dir, self.category
        ))
    }
}

/// The catalog cache and product administration operations.
///
/// Cheaply cloneable via `Arc`.
pub struct CatalogService<T> {
    inner: Arc<CatalogInner<T>>,
}

impl<T> Clone for CatalogService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CatalogInner<T> {
    transport: Arc<T>,
    products: watch::Sender<Vec<Product>>,
    cache: Cache<String, PageResponse<Product>>,
}

impl<T: Transport> CatalogService<T> {
    /// Create a catalog service over the given transport.
    pub(crate) fn new(transport: Arc<T>) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogInner {
                transport,
                products: watch::Sender::new(Vec::new()),
                cache,
            }),
        }
    }

    /// Fetch products matching `filter` and make them the current set.
    ///
    /// Never fails: a transport or decode failure serves the bundled
    /// dataset instead.
    #[instrument(skip(self))]
    pub async fn fetch(&self, filter: &ProductFilter) -> PageResponse<Product> {
        let cache_key = filter.cache_key();

        if let Some(key) = &cache_key
            && let Some(page) = self.inner.cache.get(key).await
        {
            debug!("cache hit for products");
            self.inner.products.send_replace(page.content.clone());
            return page;
        }

        let page = match self.fetch_remote(filter).await {
            Ok(page) => {
                if let Some(key) = cache_key {
                    self.inner.cache.insert(key, page.clone()).await;
                }
                page
            }
            Err(e) => {
                tracing::warn!(error = %e, "product fetch failed, serving bundled catalog");
                fallback_page()
            }
        };

        self.inner.products.send_replace(page.content.clone());
        page
    }

    async fn fetch_remote(
        &self,
        filter: &ProductFilter,
    ) -> std::result::Result<PageResponse<Product>, ApiError> {
        let value = self
            .inner
            .transport
            .get("/products", &filter.to_query())
            .await?;
        let response: ProductsResponse = serde_json::from_value(value)?;
        Ok(response.into_page())
    }

    /// The latest fetched product set.
    #[must_use]
    pub fn current_products(&self) -> Vec<Product> {
        self.inner.products.borrow().clone()
    }

    /// Subscribe to changes of the current product set.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Product>> {
        self.inner.products.subscribe()
    }

    /// Resolve a product id against the current set.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<Product> {
        self.inner.products.borrow().iter().find(|p| p.id == id).cloned()
    }

    /// Fetch the default product set if nothing has been loaded yet.
    ///
    /// The reconciliation engines call this before rehydrating so local
    /// records are never resolved against an empty catalog.
    pub async fn ensure_loaded(&self) {
        if self.inner.products.borrow().is_empty() {
            self.fetch(&ProductFilter::default()).await;
        }
    }

    /// Fetch a single product via `GET /products/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request
    /// fails.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: ProductId) -> Result<Product> {
        let value = self
            .inner
            .transport
            .get(&format!("/products/{id}"), &[])
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Create a product via `POST /products`.
    ///
    /// The created product is prepended to the current set. Validation
    /// failures surface verbatim as [`ApiError::Validation`].
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the payload or the
    /// request fails.
    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create(&self, request: &ProductRequest) -> Result<Product> {
        let value = self
            .inner
            .transport
            .post("/products", serde_json::to_value(request)?)
            .await?;
        let product: Product = serde_json::from_value(value)?;

        self.inner
            .products
            .send_modify(|products| products.insert(0, product.clone()));
        self.inner.cache.invalidate_all();

        Ok(product)
    }

    /// Update a product via `PATCH /products/{id}`.
    ///
    /// Validation failures surface verbatim; a write that fails below
    /// validation is applied to the local set instead so the catalog
    /// view keeps working, mirroring the read-side degradation.
    ///
    /// # Errors
    ///
    /// Returns an error on validation failure, or when the write failed
    /// and the product is not in the current set either.
    #[instrument(skip(self, request), fields(product = %id))]
    pub async fn update(&self, id: ProductId, request: &ProductRequest) -> Result<Product> {
        let result = self
            .inner
            .transport
            .patch(&format!("/products/{id}"), serde_json::to_value(request)?)
            .await;

        match result {
            Ok(value) => {
                let product: Product = serde_json::from_value(value)?;
                self.inner.products.send_modify(|products| {
                    if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
                        *existing = product.clone();
                    }
                });
                self.inner.cache.invalidate_all();
                Ok(product)
            }
            Err(err @ ApiError::Validation(_)) => Err(err.into()),
            Err(e) => {
                tracing::warn!(error = %e, product = %id, "product update failed, applying locally");
                let mut updated = None;
                self.inner.products.send_modify(|products| {
                    if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
                        apply_request(existing, request);
                        updated = Some(existing.clone());
                    }
                });
                self.inner.cache.invalidate_all();
                updated.map_or(Err(e.into()), Ok)
            }
        }
    }

    /// Delete a product via `DELETE /products/{id}`.
    ///
    /// The product is removed from the current set even when the remote
    /// delete fails.
    ///
    /// # Errors
    ///
    /// Returns an error only on validation failure.
    #[instrument(skip(self), fields(product = %id))]
    pub async fn delete(&self, id: ProductId) -> Result<()> {
        if let Err(e) = self.inner.transport.delete(&format!("/products/{id}")).await {
            match e {
                ApiError::Validation(_) => return Err(e.into()),
                _ => {
                    tracing::warn!(error = %e, product = %id, "product delete failed remotely, removing locally");
                }
            }
        }

        self.inner
            .products
            .send_modify(|products| products.retain(|p| p.id != id));
        self.inner.cache.invalidate_all();
        Ok(())
    }
}

/// Overwrite a product's editable fields from an admin request.
fn apply_request(product: &mut Product, request: &ProductRequest) {
    product.code = request.code.clone();
    product.name = request.name.clone();
    product.description = request.description.clone().unwrap_or_default();
    product.image = request.image.clone().unwrap_or_default();
    product.category = request.category;
    product.price = request.price;
    product.quantity = request.quantity;
    product.internal_reference = request.internal_reference.clone();
    product.shell_id = request.shell_id;
    product.inventory_status = request.inventory_status;
    product.rating = request.rating;
    product.updated_at = Utc::now();
}

/// The bundled dataset as a single page.
fn fallback_page() -> PageResponse<Product> {
    serde_json::from_str::<Vec<Product>>(DEFAULT_CATALOG).map_or_else(
        |e| {
            tracing::error!(error = %e, "bundled catalog is unreadable");
            PageResponse::single(Vec::new())
        },
        PageResponse::single,
    )
}
