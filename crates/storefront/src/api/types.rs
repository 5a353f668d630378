//! Wire types for the shop API.
//!
//! Field names follow the remote API's camelCase JSON. Conversions into
//! the engine models live next to the engines.

use clementine_core::{Category, Email, InventoryStatus, PageResponse, Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Cart
// =============================================================================

/// A cart line as returned by `GET /cart` and `POST /cart/add`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemDto {
    pub id: i64,
    pub product: Product,
    pub quantity: u32,
}

/// Body of `POST /cart/add`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PATCH /cart/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

// =============================================================================
// Wishlist
// =============================================================================

/// A wishlist entry as returned by `GET /wishlist` and
/// `POST /wishlist/add`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemDto {
    pub id: i64,
    pub product: Product,
}

/// Body of `POST /wishlist/add`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItemRequest {
    pub product_id: ProductId,
}

// =============================================================================
// Products
// =============================================================================

/// `GET /products` answers a flat array without pagination parameters
/// and a page envelope with them; both decode into this.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductsResponse {
    Page(PageResponse<Product>),
    List(Vec<Product>),
}

impl ProductsResponse {
    /// Normalize to a page envelope; a flat list becomes a single page.
    #[must_use]
    pub fn into_page(self) -> PageResponse<Product> {
        match self {
            Self::Page(page) => page,
            Self::List(products) => PageResponse::single(products),
        }
    }
}

/// Body of `POST /products` and `PATCH /products/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: Category,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell_id: Option<i64>,
    pub inventory_status: InventoryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

// =============================================================================
// Account
// =============================================================================

/// Body of `POST /account`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub firstname: String,
    pub email: Email,
    pub password: String,
}

/// Body of `POST /token`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: Email,
    pub password: String,
}

/// Response of `POST /token`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// =============================================================================
// Contact
// =============================================================================

/// Body of `POST /contact`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest {
    pub email: Email,
    pub message: String,
}

/// Response of `POST /contact`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactResponse {
    pub message: String,
}
