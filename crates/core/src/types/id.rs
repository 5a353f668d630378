//! Newtype IDs for type-safe entity references.

use serde::{Deserialize, Serialize};

/// Identifier of a catalog product.
///
/// Wraps the server-assigned numeric id so product ids cannot be mixed
/// up with cart line or wishlist entry ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Create a new product id from an i64 value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the underlying i64 value.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ProductId> for i64 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

/// Identifier of a cart line or wishlist entry.
///
/// Lines held only on this client (anonymous mode) carry a locally
/// generated id; lines returned by the server carry the server-assigned
/// one. Keeping the two in separate variants makes collisions impossible
/// without reserving numeric ranges for either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemId {
    /// Assigned by this client while anonymous; meaningless to the server.
    Local(u64),
    /// Assigned by the server; used in `/cart/{id}` and `/wishlist/{id}`.
    Server(i64),
}

impl ItemId {
    /// The server-assigned id, if this entry came from the server.
    #[must_use]
    pub const fn server_id(&self) -> Option<i64> {
        match self {
            Self::Local(_) => None,
            Self::Server(id) => Some(*id),
        }
    }

    /// Whether this id was generated locally.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Local(id) => write!(f, "local-{id}"),
            Self::Server(id) => write!(f, "{id}"),
        }
    }
}

impl core::str::FromStr for ItemId {
    type Err = String;

    /// Parse the `Display` form: `local-<n>` or a bare server id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("local-") {
            rest.parse::<u64>()
                .map(Self::Local)
                .map_err(|e| format!("invalid local id {s:?}: {e}"))
        } else {
            s.parse::<i64>()
                .map(Self::Server)
                .map_err(|e| format!("invalid id {s:?}: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_roundtrip() {
        let id = ProductId::new(42);
        assert_eq!(id.as_i64(), 42);
        assert_eq!(i64::from(id), 42);
        assert_eq!(ProductId::from(42), id);
    }

    #[test]
    fn product_id_serde_is_transparent() {
        let id: ProductId = serde_json::from_str("7").expect("parse");
        assert_eq!(id, ProductId::new(7));
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "7");
    }

    #[test]
    fn item_id_server_side() {
        assert_eq!(ItemId::Server(5).server_id(), Some(5));
        assert_eq!(ItemId::Local(5).server_id(), None);
        assert!(ItemId::Local(1).is_local());
        assert!(!ItemId::Server(1).is_local());
    }

    #[test]
    fn item_id_variants_never_compare_equal() {
        assert_ne!(ItemId::Local(3), ItemId::Server(3));
    }

    #[test]
    fn item_id_display() {
        assert_eq!(ItemId::Local(9).to_string(), "local-9");
        assert_eq!(ItemId::Server(9).to_string(), "9");
    }

    #[test]
    fn item_id_parses_its_display_form() {
        assert_eq!("local-9".parse::<ItemId>(), Ok(ItemId::Local(9)));
        assert_eq!("42".parse::<ItemId>(), Ok(ItemId::Server(42)));
        assert!("local-x".parse::<ItemId>().is_err());
        assert!("nope".parse::<ItemId>().is_err());
    }
}
