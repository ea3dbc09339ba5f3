//! Test logging

use tracing_subscriber::{fmt, EnvFilter};

/// Install a test-friendly subscriber once per process.
///
/// Honors `RUST_LOG`, defaulting to `warn`. Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init();
}
