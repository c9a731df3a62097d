//! Structured logging with tracing
//!
//! Console output on stderr in text or JSON (stdout is left to command
//! results), optionally mirrored to a daily rolling
//! file. `CATALOG_LOG` overrides the configured level with any `EnvFilter`
//! directive (e.g. `CATALOG_LOG=catalog_application=debug,info`).

use crate::config::LoggingConfig;
use crate::constants::LOG_FILTER_ENV;
use catalog_domain::error::{Error, Result};
use std::path::Path;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber
///
/// Fails when the level is invalid or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("catalog.log")),
        )
    });

    // The layer types differ per format, hence the separate branches.
    let installed = if config.json_format {
        let console = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .json()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(console).with(file).try_init()
        } else {
            registry.with(console).try_init()
        }
    } else {
        let console = fmt::layer().with_writer(std::io::stderr).with_target(true);
        let registry = Registry::default().with(filter);
        if let Some(appender) = file_appender {
            let file = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true);
            registry.with(console).with(file).try_init()
        } else {
            registry.with(console).try_init()
        }
    };
    installed.map_err(|e| Error::configuration(format!("Failed to install logger: {e}")))?;

    info!(%level, json = config.json_format, "Logging initialized");
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: &Path, success: bool) {
    if success {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        warn!(path = %config_path.display(), "Configuration file not found");
    }
}
