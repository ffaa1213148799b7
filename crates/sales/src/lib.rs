//! Sales contexts of the cart engine.
//!
//! POS carts (one per store) and order edit sessions. Each owns a single
//! line collection; nothing here performs IO.

pub mod cart;
pub mod edit;
pub mod totals;

pub use cart::{PosCarts, SaleSubmission, StoreCart};
pub use edit::OrderEditSession;
pub use totals::CartTotals;
