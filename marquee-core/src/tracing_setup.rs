//! Tracing setup for Marquee
//!
//! Console output follows the user's chosen level while the full trace of the
//! last run is written to disk for debugging.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::MarqueeError;

/// File name of the per-run debug log, overwritten on every start.
pub const LAST_RUN_LOG: &str = "marquee-last-run.log";

/// Initialize tracing with dual output: console (user level) + file (full debug)
///
/// `RUST_LOG` overrides `console_level` for the console layer. The file layer
/// always records everything at TRACE into `<logs_dir>/marquee-last-run.log`
/// (`logs_dir` defaults to `./logs`). Returns the path of the log file.
///
/// # Errors
///
/// - `MarqueeError::Io` - Logs directory or log file could not be created
/// - `MarqueeError::Configuration` - A global subscriber is already installed
pub fn init_tracing(
    console_level: Level,
    logs_dir: Option<&Path>,
) -> Result<PathBuf, MarqueeError> {
    let log_file_path = prepare_log_file_path(logs_dir)?;
    let log_file = File::create(&log_file_path)?;

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.to_string()));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| MarqueeError::Configuration {
            reason: format!("Tracing already initialized: {e}"),
        })?;

    tracing::info!(
        "Tracing initialized: console={}, debug_file={}",
        console_level,
        log_file_path.display()
    );

    Ok(log_file_path)
}

/// Ensures the logs directory exists and returns the debug log path inside it.
///
/// # Errors
///
/// - `MarqueeError::Io` - Directory creation failed
pub fn prepare_log_file_path(logs_dir: Option<&Path>) -> Result<PathBuf, MarqueeError> {
    let logs_path = logs_dir.unwrap_or_else(|| Path::new("logs"));
    create_dir_all(logs_path)?;
    Ok(logs_path.join(LAST_RUN_LOG))
}

/// CLI log levels for user control
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Only error messages
    Error,
    /// Warning and error messages
    Warn,
    /// Informational, warning, and error messages
    Info,
    /// Debug, informational, warning, and error messages
    Debug,
    /// All messages including detailed tracing
    Trace,
}

impl CliLogLevel {
    /// Converts CLI log level to tracing Level enum.
    ///
    /// # Examples
    /// ```
    /// use marquee_core::tracing_setup::CliLogLevel;
    ///
    /// let level = CliLogLevel::Info.as_tracing_level();
    /// assert_eq!(level, tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        match self {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::str::FromStr for CliLogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(CliLogLevel::Error),
            "warn" => Ok(CliLogLevel::Warn),
            "info" => Ok(CliLogLevel::Info),
            "debug" => Ok(CliLogLevel::Debug),
            "trace" => Ok(CliLogLevel::Trace),
            _ => Err(format!("Invalid log level: {s}")),
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_round_trip_through_display() {
        for level in [
            CliLogLevel::Error,
            CliLogLevel::Warn,
            CliLogLevel::Info,
            CliLogLevel::Debug,
            CliLogLevel::Trace,
        ] {
            assert_eq!(level.to_string().parse::<CliLogLevel>(), Ok(level));
        }
        assert!("loud".parse::<CliLogLevel>().is_err());
    }

    #[test]
    fn test_prepare_log_file_path_creates_directory() {
        let temp = tempfile::tempdir().unwrap();
        let logs_dir = temp.path().join("nested").join("logs");

        let path = prepare_log_file_path(Some(&logs_dir)).unwrap();

        assert!(logs_dir.is_dir());
        assert_eq!(path, logs_dir.join(LAST_RUN_LOG));
    }

    #[test]
    fn test_init_tracing_writes_log_file() {
        let temp = tempfile::tempdir().unwrap();

        let path = init_tracing(Level::WARN, Some(temp.path())).unwrap();

        assert!(path.exists());
        assert!(init_tracing(Level::WARN, Some(temp.path())).is_err());
    }
}
