//! Clementine Storefront client library.
//!
//! The data layer of the Clementine storefront: product catalog,
//! shopping cart, wishlist, authentication, and the contact form, all
//! against the remote shop API.
//!
//! # Architecture
//!
//! - [`api`] - transport seam: JSON verbs against the shop API, bearer
//!   auth attached when a credential is present
//! - [`storage`] - durable key-value store for the credential and the
//!   anonymous cart/wishlist records
//! - [`services`] - the session, catalog, cart, wishlist, and contact
//!   services; cart and wishlist reconcile local state against the
//!   server across login/logout
//! - [`state`] - the [`state::Shop`] container that owns and wires the
//!   services
//!
//! Cart and wishlist state lives locally while the user is anonymous
//! and on the server once authenticated; the one-time merge at login
//! pushes local records to the server and then trusts the server's
//! response.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, ShopError};
pub use state::Shop;
