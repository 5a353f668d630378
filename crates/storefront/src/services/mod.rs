//! Storefront services.
//!
//! - [`session`] - authentication and the current credential
//! - [`catalog`] - product catalog cache and product administration
//! - [`cart`] - cart reconciliation engine
//! - [`wishlist`] - wishlist reconciliation engine
//! - [`contact`] - contact form submission
//!
//! The cart and wishlist engines are the interesting part: both run the
//! same two-mode state machine (anonymous against local storage,
//! authenticated against the server) and merge local state into the
//! server exactly once per login.

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod session;
pub mod wishlist;

pub use cart::{CartLine, CartService};
pub use catalog::{CatalogService, ProductFilter, SortDirection};
pub use contact::ContactService;
pub use session::Session;
pub use wishlist::{WishlistEntry, WishlistService};
