//! Telemetry initialisation for `pastectl`.
//!
//! Compact human-readable logs on stderr, so stdout carries only links and
//! plaintext. Quiet (`warn`) unless `PASTECTL_LOG_LEVEL` or `RUST_LOG` says
//! otherwise.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the tracing subscriber for `pastectl`.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise pastectl tracing subscriber: {e}"))
}
