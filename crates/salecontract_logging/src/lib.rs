//! Shared logging utilities for sale contract binaries.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "salecontract=info";
const MAX_LOG_FILES: usize = 5;

/// Logging configuration shared by sale contract binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Directory holding the daily log files.
    pub log_dir: &'a Path,
    /// Filter used when `RUST_LOG` is unset.
    pub filter: Option<&'a str>,
    pub verbose: bool,
}

/// Initialize tracing with a daily log file and stderr output.
///
/// Without `verbose` the console only shows warnings; the file always
/// receives everything the filter lets through.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let file_writer = file_appender(config.log_dir, config.app_name)?;

    let default_filter = config.filter.unwrap_or(DEFAULT_LOG_FILTER);
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    // Synchronous writer: no worker guard to keep alive.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Open `<log_dir>/<app_name>.<date>.log`, rolled daily, keeping the
/// newest five files.
pub fn file_appender(log_dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create logs directory: {}", log_dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
        .with_context(|| format!("Failed to open log file for {}", app_name))
}

/// Resolve the sale contract home directory.
///
/// Priority:
/// 1) SALECONTRACT_HOME
/// 2) the user's home directory
/// 3) ./.salecontract
pub fn salecontract_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("SALECONTRACT_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".salecontract")
}

/// Logs directory under a given home: <home>/logs
pub fn logs_dir(home: &Path) -> PathBuf {
    home.join("logs")
}
