//! Cart quantity with lenient coercion.

use serde::{Deserialize, Serialize};

/// A cart line quantity, always at least 1.
///
/// User input reaches the engines through form fields and query
/// parameters where "no value" and garbage are routine; anything that
/// does not parse to a positive integer coerces to 1 rather than
/// erroring or leaving a zero quantity behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// The coercion floor.
    pub const ONE: Self = Self(1);

    /// Create a quantity, coercing zero to 1.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        if value == 0 { Self(1) } else { Self(value) }
    }

    /// Coerce an optional raw value; `None` and non-positive values
    /// become 1.
    #[must_use]
    pub fn coerce(raw: Option<i64>) -> Self {
        match raw {
            Some(value) if value > 0 => {
                Self(u32::try_from(value).unwrap_or(u32::MAX))
            }
            _ => Self::ONE,
        }
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl From<u32> for Quantity {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl core::str::FromStr for Quantity {
    type Err = core::convert::Infallible;

    /// Parse leniently; unparsable input coerces to 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::coerce(s.trim().parse::<i64>().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coerces_to_one() {
        assert_eq!(Quantity::new(0).get(), 1);
        assert_eq!(Quantity::from(0).get(), 1);
    }

    #[test]
    fn positive_values_pass_through() {
        assert_eq!(Quantity::new(3).get(), 3);
        assert_eq!(Quantity::coerce(Some(7)).get(), 7);
    }

    #[test]
    fn none_and_negative_coerce_to_one() {
        assert_eq!(Quantity::coerce(None).get(), 1);
        assert_eq!(Quantity::coerce(Some(0)).get(), 1);
        assert_eq!(Quantity::coerce(Some(-4)).get(), 1);
    }

    #[test]
    fn unparsable_strings_coerce_to_one() {
        assert_eq!("abc".parse::<Quantity>().map(|q| q.get()), Ok(1));
        assert_eq!("".parse::<Quantity>().map(|q| q.get()), Ok(1));
        assert_eq!(" 5 ".parse::<Quantity>().map(|q| q.get()), Ok(5));
    }
}
