//! Value objects: equality by value, not identity.
//!
//! Prices and variant keys are values. Two lines priced at `Money(500)` carry
//! the same price; two lines with the same `VariantKey` describe the same
//! product configuration.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. To
/// "modify" one, build a new one.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Distinguishes variants of the same product (e.g. a stock id, "red-M").
///
/// A line without a variant key stands for the base product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariantKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl core::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for VariantKey {}
impl ValueObject for Money {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_keys_compare_by_value() {
        assert_eq!(VariantKey::from("red-M"), VariantKey::new(String::from("red-M")));
        assert_ne!(VariantKey::from("red-M"), VariantKey::from("red-L"));
    }
}
