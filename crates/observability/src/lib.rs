//! Process-wide tracing setup shared by the homies binaries and tests.

/// Initialize tracing/logging using `RUST_LOG` and `HOMIES_LOG_FORMAT`.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init();
}

pub mod tracing;

pub use self::tracing::LogFormat;
