//! `poscart-core` — domain foundation building blocks for the cart engine.
//!
//! Identifiers, money, and the small trait vocabulary shared by every cart
//! context. No IO lives here.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{LocalId, LocalIdSequence, OrderId, ProductId, PurchaseOrderId, StoreId};
pub use money::Money;
pub use value_object::{ValueObject, VariantKey};
