//! Logging configuration types

use crate::constants::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "log level cannot be empty"))]
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}
