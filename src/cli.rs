//! Command-line configuration.

use crate::browser::DEFAULT_PAGE_SIZE;
use crate::source::{CachedSource, DemoSource, JsonFileSource, PatientSource, SqliteSource};
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(
    name = "vitalink",
    version,
    about = "Browse the patients assigned to a VitaLink doctor",
    long_about = "Search, sort and page through a doctor's patients in the terminal.\n\n\
                  Patients come from a saved dashboard response (JSON), a local SQLite \
                  cache, or the bundled demo roster."
)]
pub struct Cli {
    /// Where patients are loaded from.
    #[arg(long, value_enum, default_value = "demo")]
    pub source: SourceKind,

    /// File to read for the json and sqlite sources.
    #[arg(long, value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// SQLite file that keeps the last good fetch and is served when the
    /// source fails.
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Rows per page.
    #[arg(long = "page-size", value_name = "N", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: NonZeroUsize,

    /// Screen refresh rate in ticks per second.
    #[arg(long = "tick-rate", value_name = "HZ", default_value_t = 30.0)]
    pub tick_rate: f64,

    /// Log level (error, warn, info, debug, trace). Overridden by RUST_LOG.
    #[arg(long = "log-level", value_enum, default_value = "info")]
    pub log_level: LogLevelArg,

    /// Log file. The terminal is owned by the UI, so logs are discarded
    /// unless this is set.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Demo,
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for tracing::Level {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => tracing::Level::ERROR,
            LogLevelArg::Warn => tracing::Level::WARN,
            LogLevelArg::Info => tracing::Level::INFO,
            LogLevelArg::Debug => tracing::Level::DEBUG,
            LogLevelArg::Trace => tracing::Level::TRACE,
        }
    }
}

impl Cli {
    /// Builds the configured patient source.
    pub fn patient_source(&self) -> Result<Box<dyn PatientSource>> {
        let primary: Box<dyn PatientSource> = match (self.source, &self.path) {
            (SourceKind::Demo, _) => Box::new(DemoSource),
            (SourceKind::Json, Some(path)) => Box::new(JsonFileSource::new(path)),
            (SourceKind::Sqlite, Some(path)) => Box::new(SqliteSource::new(path)),
            (kind, None) => {
                let name = format!("{kind:?}").to_lowercase();
                bail!("--source {name} requires --path")
            }
        };

        Ok(match &self.cache {
            Some(cache) => Box::new(CachedSource::new(primary, SqliteSource::new(cache))),
            None => primary,
        })
    }

    /// Time between ticks, `1 / --tick-rate` seconds.
    pub fn tick_period(&self) -> Result<Duration> {
        if !(self.tick_rate.is_finite() && self.tick_rate > 0.0) {
            bail!("--tick-rate must be a positive number, got {}", self.tick_rate);
        }
        Duration::try_from_secs_f64(1.0 / self.tick_rate)
            .with_context(|| format!("--tick-rate {} is too slow", self.tick_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["vitalink"]).unwrap();
        assert_eq!(cli.source, SourceKind::Demo);
        assert_eq!(cli.page_size.get(), 10);
        assert!(cli.tick_period().is_ok());
        assert_eq!(cli.patient_source().unwrap().describe(), "demo roster");
    }

    #[test]
    fn file_sources_need_a_path() {
        let cli = Cli::try_parse_from(["vitalink", "--source", "json"]).unwrap();
        assert!(cli.patient_source().is_err());

        let cli =
            Cli::try_parse_from(["vitalink", "--source", "sqlite", "--path", "cache.db"]).unwrap();
        assert_eq!(cli.patient_source().unwrap().describe(), "SQLite cache.db");
    }

    #[test]
    fn page_size_must_be_positive() {
        assert!(Cli::try_parse_from(["vitalink", "--page-size", "0"]).is_err());
        let cli = Cli::try_parse_from(["vitalink", "--page-size", "5"]).unwrap();
        assert_eq!(cli.page_size.get(), 5);
    }

    #[test]
    fn tick_rate_must_be_positive() {
        let cli = Cli::try_parse_from(["vitalink", "--tick-rate", "0"]).unwrap();
        assert!(cli.tick_period().is_err());

        let cli = Cli::try_parse_from(["vitalink", "--tick-rate", "4"]).unwrap();
        assert_eq!(cli.tick_period().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn tiny_tick_rate_is_an_error() {
        let cli = Cli::try_parse_from(["vitalink", "--tick-rate", "1e-20"]).unwrap();
        let err = cli.tick_period().unwrap_err();
        assert!(err.to_string().contains("too slow"), "{err}");
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
