//! Configuration Loader Tests
//!
//! Environment-dependent tests run inside `figment::Jail`, which serializes
//! them and restores the environment and working directory afterwards.

use catalog_infrastructure::config::loader::validate_app_config;
use catalog_infrastructure::config::{AppConfig, ConfigLoader, QueueConfig};
use catalog_infrastructure::constants::{DEFAULT_AMQP_URL, DEFAULT_LOG_LEVEL};
use catalog_providers::store::PostgresProductStore;
use figment::Jail;
use std::time::Duration;
use tempfile::TempDir;

const IN_PROCESS_TOML: &str = r#"
[store]
provider = "memory"

[cache]
provider = "moka"
ttl_secs = 5

[queue]
provider = "memory"
name = "catalog_changes"
"#;

#[test]
fn test_defaults_require_database_url() {
    Jail::expect_with(|jail| {
        jail.clear_env();

        let err = ConfigLoader::new().load().unwrap_err();
        assert!(
            err.to_string().contains("store.url is required"),
            "unexpected error: {err}"
        );
        Ok(())
    });
}

#[test]
fn test_well_known_env_vars_override_defaults() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("DATABASE_URL", "postgres://catalog:secret@db:5432/catalog");
        jail.set_env("REDIS_URL", "redis://cache:6379");
        jail.set_env("RABBITMQ_URL", "amqp://rabbitmq:5672");
        jail.set_env("RABBITMQ_USER", "catalog");
        jail.set_env("RABBITMQ_PASSWORD", "hunter2");

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(
            config.store.url.as_deref(),
            Some("postgres://catalog:secret@db:5432/catalog")
        );
        assert_eq!(config.cache.url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.queue.url.as_deref(), Some("amqp://rabbitmq:5672"));
        assert_eq!(config.queue.username.as_deref(), Some("catalog"));
        assert_eq!(config.queue.password.as_deref(), Some("hunter2"));
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
        Ok(())
    });
}

#[test]
fn test_component_env_vars_build_connection_urls() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("POSTGRES_HOST", "db");
        jail.set_env("POSTGRES_PORT", "5433");
        jail.set_env("POSTGRES_USER", "catalog");
        jail.set_env("POSTGRES_PASSWORD", "it's@secret");
        jail.set_env("POSTGRES_DB", "shop");
        jail.set_env("REDIS_HOST", "redis");
        jail.set_env("REDIS_PORT", "6380");

        let config = ConfigLoader::new().load().unwrap();

        let store_url = config.store.url.clone().unwrap();
        assert_eq!(
            store_url,
            r"host='db' port='5433' user='catalog' password='it\'s@secret' dbname='shop'"
        );
        assert!(PostgresProductStore::new(&store_url, 1, Duration::from_secs(1)).is_ok());
        assert_eq!(config.cache.url.as_deref(), Some("redis://redis:6380"));
        Ok(())
    });
}

#[test]
fn test_partial_component_env_vars_use_defaults() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("POSTGRES_HOST", "db");
        jail.set_env("REDIS_HOST", "cache");

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(
            config.store.url.as_deref(),
            Some("host='db' port='5432' user='postgres' dbname='postgres'")
        );
        assert_eq!(config.cache.url.as_deref(), Some("redis://cache:6379"));
        Ok(())
    });
}

#[test]
fn test_database_url_wins_over_component_vars() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("POSTGRES_HOST", "db");
        jail.set_env("DATABASE_URL", "postgres://catalog@primary:5432/catalog");
        jail.set_env("REDIS_PORT", "6380");
        jail.set_env("REDIS_URL", "redis://explicit:6379");

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(
            config.store.url.as_deref(),
            Some("postgres://catalog@primary:5432/catalog")
        );
        assert_eq!(config.cache.url.as_deref(), Some("redis://explicit:6379"));
        Ok(())
    });
}

#[test]
fn test_prefixed_env_wins_over_well_known_vars() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("DATABASE_URL", "postgres://legacy/catalog");
        jail.set_env("CATALOG_STORE__URL", "postgres://prefixed/catalog");
        jail.set_env("CATALOG_CACHE__TTL_SECS", "30");
        jail.set_env("CATALOG_CONSUMER__ENABLED", "false");

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(config.store.url.as_deref(), Some("postgres://prefixed/catalog"));
        assert_eq!(config.cache.ttl_secs, 30);
        assert!(!config.consumer.enabled);
        Ok(())
    });
}

#[test]
fn test_config_file_discovered_in_working_directory() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("catalog.toml", IN_PROCESS_TOML)?;

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(config.store.provider, "memory");
        assert_eq!(config.cache.provider, "moka");
        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.queue.name, "catalog_changes");
        // Untouched sections keep their defaults
        assert_eq!(config.queue.url.as_deref(), Some(DEFAULT_AMQP_URL));
        Ok(())
    });
}

#[test]
fn test_env_overrides_config_file() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("catalog.toml", IN_PROCESS_TOML)?;
        jail.set_env("CATALOG_QUEUE__NAME", "product_queue");

        let config = ConfigLoader::new().load().unwrap();

        assert_eq!(config.queue.name, "product_queue");
        assert_eq!(config.cache.ttl_secs, 5);
        Ok(())
    });
}

#[test]
fn test_explicit_missing_config_file_is_an_error() {
    Jail::expect_with(|jail| {
        jail.clear_env();

        let err = ConfigLoader::new()
            .with_config_path("does-not-exist.toml")
            .load()
            .unwrap_err();
        assert!(err.to_string().contains("Configuration file not found"));
        Ok(())
    });
}

#[test]
fn test_invalid_values_are_rejected() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("catalog.toml", IN_PROCESS_TOML)?;

        jail.set_env("CATALOG_CACHE__TTL_SECS", "0");
        assert!(ConfigLoader::new().load().is_err());

        jail.set_env("CATALOG_CACHE__TTL_SECS", "60");
        jail.set_env("CATALOG_CONSUMER__PREFETCH", "0");
        assert!(ConfigLoader::new().load().is_err());

        jail.set_env("CATALOG_CONSUMER__PREFETCH", "1");
        assert!(ConfigLoader::new().load().is_ok());
        Ok(())
    });
}

#[test]
fn test_provider_urls_are_required() {
    let mut config = AppConfig::default();
    config.store.provider = "memory".to_string();
    assert!(validate_app_config(&config).is_ok());

    config.cache.url = None;
    let err = validate_app_config(&config).unwrap_err();
    assert!(err.to_string().contains("cache.url is required"));

    config.cache.provider = "moka".to_string();
    assert!(validate_app_config(&config).is_ok());

    config.queue.url = Some("  ".to_string());
    let err = validate_app_config(&config).unwrap_err();
    assert!(err.to_string().contains("queue.url is required"));
}

#[test]
fn test_empty_queue_name_is_rejected() {
    let mut config = AppConfig::default();
    config.store.provider = "memory".to_string();
    config.queue.name = String::new();

    assert!(validate_app_config(&config).is_err());
}

#[test]
fn test_config_save_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("catalog.toml");

    let mut original = AppConfig::default();
    original.store.provider = "memory".to_string();
    original.cache.ttl_secs = 120;
    original.consumer.log_capacity = 50;

    Jail::expect_with(|jail| {
        jail.clear_env();

        let loader = ConfigLoader::new();
        loader.save_to_file(&original, &config_path).unwrap();

        let loaded = ConfigLoader::new()
            .with_config_path(&config_path)
            .load()
            .unwrap();

        assert_eq!(loaded.store.provider, "memory");
        assert_eq!(loaded.cache.ttl_secs, 120);
        assert_eq!(loaded.consumer.log_capacity, 50);
        Ok(())
    });
}

#[test]
fn test_queue_config_debug_masks_password() {
    let config = QueueConfig {
        password: Some("hunter2".to_string()),
        ..QueueConfig::default()
    };

    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("***"));
}
