//! Logging through `tracing` and `tracing-subscriber`.
//!
//! The terminal belongs to the UI while the app runs, so log events are
//! written to a file (appending) or dropped entirely. `RUST_LOG`, when
//! set, takes precedence over the configured level.
//!
//! - `warn`: fetch failures, skipped records, cache problems
//! - `info`: collections loaded, refreshes
//! - `debug`: browser recomputations, screen changes
//! - `trace`: every browser action

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. Does nothing when `log_file` is `None`.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a subscriber is
/// already installed.
pub fn init_logging(level: Level, log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(layer)
        .try_init()
        .context("Failed to install log subscriber")?;
    Ok(())
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vitalink={}", level.as_str().to_ascii_lowercase())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_file_is_a_no_op() {
        assert!(init_logging(Level::DEBUG, None).is_ok());
    }

    #[test]
    fn default_filter_targets_this_crate() {
        if std::env::var_os("RUST_LOG").is_none() {
            let filter = build_env_filter(Level::DEBUG).to_string().to_ascii_lowercase();
            assert!(filter.contains("vitalink=debug"), "{filter}");
        }
    }

    #[test]
    fn unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        assert!(init_logging(Level::INFO, Some(dir.path())).is_err());
    }
}
