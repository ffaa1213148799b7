//! `poscart-cart` — cart/order line reconciliation engine.
//!
//! Pure, synchronous domain logic (no IO, no HTTP, no storage). Callers own a
//! [`LineCollection`] per transaction context and feed it candidates built
//! from product/stock lookups.

pub mod collection;
pub mod command;
pub mod config;
pub mod line;
pub mod outcome;

pub use collection::LineCollection;
pub use command::CartCommand;
pub use config::CartConfig;
pub use line::{LineDraft, LineItem, LinePatch, PricingMode, ReceiptStatus};
pub use outcome::{IgnoreReason, Outcome};
