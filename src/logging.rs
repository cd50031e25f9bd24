use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Progress markers are `info` events on stderr;
/// `RUST_LOG` overrides the level, and `quiet` turns logging off entirely.
pub fn init(quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e).context("failed to install log subscriber"))
}
