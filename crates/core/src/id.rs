//! Strongly-typed identifiers used across the cart domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a store (scope of a POS cart).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(Uuid);

/// Identifier of a sales order being edited.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

/// Identifier of a purchase order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::invalid_id(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(StoreId, "StoreId");
impl_uuid_newtype!(OrderId, "OrderId");
impl_uuid_newtype!(PurchaseOrderId, "PurchaseOrderId");

/// External product identifier, as handed out by the catalog API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Caller-assigned identity of a line within its collection.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LocalId(pub u64);

impl core::fmt::Display for LocalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Hands out increasing [`LocalId`]s for newly created lines.
///
/// The engine never assigns ids; UI code owns one sequence per collection.
#[derive(Debug, Clone, Default)]
pub struct LocalIdSequence {
    next: u64,
}

impl LocalIdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start after the highest id already in use (e.g. lines loaded from a saved order).
    pub fn after<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = LocalId>,
    {
        let next = ids
            .into_iter()
            .map(|id| id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self { next }
    }

    pub fn next_id(&mut self) -> LocalId {
        let id = LocalId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}
