//! Tracing subscriber setup: JSON logs to stdout, filtered by the CLI
//! verbosity or `RUST_LOG` when no verbosity flag is given.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// `-v` count to level. Zero means no explicit level; the filter then falls
/// back to `RUST_LOG`, or `error` when that is unset too.
const fn verbosity_level(verbosity: u8) -> Option<Level> {
    match verbosity {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        _ => Some(Level::TRACE),
    }
}

/// Install the global subscriber for the given `-v` count.
///
/// # Errors
/// Returns an error if a subscriber is already installed.
pub fn init(verbosity: u8) -> Result<()> {
    let filter = match verbosity_level(verbosity) {
        Some(level) => EnvFilter::default().add_directive(level.into()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
    };

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_current_span(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialize tracing subscriber: {e}"))
}
