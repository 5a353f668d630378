//! Shop state container.
//!
//! [`Shop`] owns the transport, storage, and services, and wires the
//! cart and wishlist engines to the session's authentication channel.
//! Consumers receive it by injection; there is no process-wide
//! singleton.

use std::future::Future;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::api::HttpClient;
use crate::config::ShopConfig;
use crate::error::Result;
use crate::services::{
    CartService, CatalogService, ContactService, Session, WishlistService,
};
use crate::storage::{FileStore, KeyValueStore, MemoryStore, keys};

/// The storefront state container.
///
/// Cheaply cloneable via `Arc` and handed to consumers as a whole;
/// display layers read through the services' snapshot/subscription
/// views and mutate only through their operations.
#[derive(Clone)]
pub struct Shop {
    inner: Arc<ShopInner>,
}

struct ShopInner {
    config: ShopConfig,
    session: Session<HttpClient>,
    catalog: CatalogService<HttpClient>,
    cart: CartService<HttpClient>,
    wishlist: WishlistService<HttpClient>,
    contact: ContactService<HttpClient>,
}

impl Shop {
    /// Create a shop from configuration.
    ///
    /// Storage is file-backed when a path is configured, in-memory
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file or HTTP client cannot be
    /// initialized.
    pub fn new(config: ShopConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = match &config.storage_path {
            Some(path) => Arc::new(FileStore::open(path)?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Create a shop over an explicit storage implementation.
    ///
    /// A token already present in storage restores the authenticated
    /// state.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn with_storage(config: ShopConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let initial_token = storage.get(keys::TOKEN)?.map(SecretString::from);
        let (auth_tx, auth_rx) = watch::channel(initial_token);

        let transport = Arc::new(HttpClient::new(&config, auth_rx.clone())?);

        let session = Session::new(Arc::clone(&transport), Arc::clone(&storage), auth_tx);
        let catalog = CatalogService::new(Arc::clone(&transport));
        let cart = CartService::new(
            Arc::clone(&transport),
            Arc::clone(&storage),
            catalog.clone(),
            auth_rx.clone(),
        );
        let wishlist = WishlistService::new(
            Arc::clone(&transport),
            Arc::clone(&storage),
            catalog.clone(),
            auth_rx,
        );
        let contact = ContactService::new(transport);

        Ok(Self {
            inner: Arc::new(ShopInner {
                config,
                session,
                catalog,
                cart,
                wishlist,
                contact,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the authentication session.
    #[must_use]
    pub fn session(&self) -> &Session<HttpClient> {
        &self.inner.session
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService<HttpClient> {
        &self.inner.catalog
    }

    /// Get a reference to the cart engine.
    #[must_use]
    pub fn cart(&self) -> &CartService<HttpClient> {
        &self.inner.cart
    }

    /// Get a reference to the wishlist engine.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistService<HttpClient> {
        &self.inner.wishlist
    }

    /// Get a reference to the contact service.
    #[must_use]
    pub fn contact(&self) -> &ContactService<HttpClient> {
        &self.inner.contact
    }

    /// Register the engines on the session's authentication channel.
    ///
    /// Each engine first handles the current state (loading local or
    /// server data), then reacts to every authenticated-flag change;
    /// login triggers the local-to-server merge, logout the return to
    /// anonymous mode. Returns the listener task handles.
    pub fn spawn_sync_listeners(&self) -> Vec<JoinHandle<()>> {
        let cart = self.inner.cart.clone();
        let wishlist = self.inner.wishlist.clone();

        vec![
            spawn_auth_listener(self.inner.session.subscribe(), move |authenticated| {
                let cart = cart.clone();
                async move { cart.on_auth_changed(authenticated).await }
            }),
            spawn_auth_listener(self.inner.session.subscribe(), move |authenticated| {
                let wishlist = wishlist.clone();
                async move { wishlist.on_auth_changed(authenticated).await }
            }),
        ]
    }
}

/// Dispatch the authenticated flag to `handler`, once for the current
/// state and then on every change of the flag.
///
/// Token renewals that keep the flag unchanged do not re-trigger the
/// handler; the mode transition fires once per login or logout.
pub(crate) fn spawn_auth_listener<F, Fut>(
    mut rx: watch::Receiver<Option<SecretString>>,
    handler: F,
) -> JoinHandle<()>
where
    F: Fn(bool) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut current = rx.borrow_and_update().is_some();
        handler(current).await;

        while rx.changed().await.is_ok() {
            let now = rx.borrow_and_update().is_some();
            if now != current {
                current = now;
                handler(now).await;
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    async fn wait_for(predicate: impl Fn() -> bool) {
        for _ in 0..200 {
            if predicate() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn listener_fires_on_flag_changes_only() {
        let (tx, rx) = watch::channel::<Option<SecretString>>(None);
        let seen: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _handle = spawn_auth_listener(rx, move |authenticated| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(authenticated);
            }
        });

        // Initial dispatch for the anonymous state
        wait_for(|| seen.lock().unwrap().as_slice() == [false]).await;

        // Login
        tx.send_replace(Some(SecretString::from("token-1")));
        wait_for(|| seen.lock().unwrap().as_slice() == [false, true]).await;

        // Token renewal: flag unchanged, no transition
        tx.send_replace(Some(SecretString::from("token-2")));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(seen.lock().unwrap().as_slice(), [false, true]);

        // Logout
        tx.send_replace(None);
        wait_for(|| seen.lock().unwrap().as_slice() == [false, true, false]).await;
    }

    #[tokio::test]
    async fn shop_starts_anonymous_without_stored_token() {
        let config = ShopConfig::for_api_url("http://localhost:8080/api").unwrap();
        let shop = Shop::new(config).unwrap();

        assert!(!shop.session().is_authenticated());
        assert!(shop.cart().items().is_empty());
        assert_eq!(shop.wishlist().item_count(), 0);
        assert_eq!(shop.config().api_base(), "http://localhost:8080/api");
    }

    #[tokio::test]
    async fn shop_restores_session_from_storage() {
        let config = ShopConfig::for_api_url("http://localhost:8080/api").unwrap();
        let storage = Arc::new(MemoryStore::new());
        storage.set(keys::TOKEN, "stored-token").unwrap();

        let shop = Shop::with_storage(config, storage).unwrap();

        assert!(shop.session().is_authenticated());
    }
}
