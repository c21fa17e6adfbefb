//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. Filter comes from `RUST_LOG`
/// (default `info`). Calling this twice is a no-op.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
