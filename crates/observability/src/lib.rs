//! Process-wide tracing setup shared by the binaries.

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{LogFormat, init_with};
