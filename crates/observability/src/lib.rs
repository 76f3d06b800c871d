//! Tracing/logging setup shared by every process hosting the synchronizer.

/// Initialize process-wide tracing with the format from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(tracing::LogFormat::from_env());
}

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use self::tracing::LogFormat;
