//! Tracing/logging setup shared by every binary embedding the cart engine.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &ObservabilityConfig) {
    crate::tracing::init(config);
}
