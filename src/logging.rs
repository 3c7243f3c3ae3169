//! Logging initialisation via `tracing-subscriber`.
//!
//! Output goes to stderr so command output on stdout stays scriptable.
//! `RUST_LOG`, when set and valid, overrides the configured level.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Call once, from `main`.
pub fn init(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("invalid log level '{}': {}", level, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to set subscriber: {}", e))?;

    Ok(())
}
