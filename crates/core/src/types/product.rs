//! The catalog product model.
//!
//! Field names follow the remote API's camelCase JSON. Products are
//! immutable from the cart/wishlist engines' point of view; only the
//! product administration operations mutate them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;

/// A catalog product as served by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    /// Unique product code, e.g. `f230fh0g3`.
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Image reference (URL or asset name).
    #[serde(default)]
    pub image: String,
    pub category: Category,
    /// Unit price; positive. Serialized as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Units in stock.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_id: Option<i64>,
    pub inventory_status: InventoryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Epoch milliseconds on the wire.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Accessories,
    Fitness,
    Clothing,
    Electronics,
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Accessories => "Accessories",
            Self::Fitness => "Fitness",
            Self::Clothing => "Clothing",
            Self::Electronics => "Electronics",
        };
        f.write_str(name)
    }
}

impl core::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Accessories" => Ok(Self::Accessories),
            "Fitness" => Ok(Self::Fitness),
            "Clothing" => Ok(Self::Clothing),
            "Electronics" => Ok(Self::Electronics),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// Stock level indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InventoryStatus {
    #[serde(rename = "INSTOCK")]
    InStock,
    #[serde(rename = "LOWSTOCK")]
    LowStock,
    #[serde(rename = "OUTOFSTOCK")]
    OutOfStock,
}

impl core::fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::InStock => "INSTOCK",
            Self::LowStock => "LOWSTOCK",
            Self::OutOfStock => "OUTOFSTOCK",
        };
        f.write_str(name)
    }
}

impl core::str::FromStr for InventoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSTOCK" => Ok(Self::InStock),
            "LOWSTOCK" => Ok(Self::LowStock),
            "OUTOFSTOCK" => Ok(Self::OutOfStock),
            _ => Err(format!("unknown inventory status: {s}")),
        }
    }
}
