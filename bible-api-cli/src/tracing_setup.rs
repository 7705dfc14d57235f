//! Tracing setup for the bible-api CLI
//!
//! Usage:
//!   bible-api --debug serve                  # Debug logging to console
//!   RUST_LOG=bible_api_server=debug bible-api serve
//!
//! Environment variables:
//!   RUST_LOG                                 # Log filter (default: info)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Default filter: our crates at info, sqlx statement logging muted
const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets debug level if RUST_LOG is not set)
    pub debug: bool,
}

/// Filter used when RUST_LOG is absent or invalid
fn fallback_filter(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize console tracing
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_filter(config.debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
