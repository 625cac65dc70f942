//! Diagnostics go to stderr through `tracing`; stdout carries only the tables.

use tracing_subscriber::EnvFilter;

/// Honours `RUST_LOG`; otherwise `info`, or `warn` when quiet.
pub fn init(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A subscriber may already be installed (tests); keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
