//! Logging Tests

use catalog_infrastructure::config::LoggingConfig;
use catalog_infrastructure::constants::DEFAULT_LOG_LEVEL;
use catalog_infrastructure::logging::{init_logging, parse_log_level};
use tracing::Level;

#[test]
fn test_parse_log_level() {
    assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
    assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("warning").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("error").unwrap(), Level::ERROR);

    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, DEFAULT_LOG_LEVEL);
    assert!(!config.json_format);
    assert!(config.file_output.is_none());
}

#[test]
fn test_invalid_level_fails_before_installing() {
    let config = LoggingConfig {
        level: "loud".to_string(),
        ..LoggingConfig::default()
    };

    let err = init_logging(&config).unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}

#[test]
fn test_global_subscriber_is_installed_once() {
    let config = LoggingConfig {
        json_format: true,
        ..LoggingConfig::default()
    };

    assert!(init_logging(&config).is_ok());
    assert!(init_logging(&config).is_err());
}
