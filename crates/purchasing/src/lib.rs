//! Purchasing context of the cart engine (purchase order drafts).
//!
//! Deterministic in-memory logic only (no IO, no HTTP, no storage).

pub mod order;

pub use order::{PurchaseOrderDraft, PurchaseOrderSubmission};
