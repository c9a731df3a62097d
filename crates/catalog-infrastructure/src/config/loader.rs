//! Configuration loader
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. `AppConfig::default()`
//! 2. `catalog.toml` (explicit path, or the first found in the working
//!    directory, `./catalog/`, the XDG config dir)
//! 3. Per-component variables: `POSTGRES_HOST`, `POSTGRES_PORT`,
//!    `POSTGRES_USER`, `POSTGRES_PASSWORD`, `POSTGRES_DB` build `store.url`;
//!    `REDIS_HOST`, `REDIS_PORT` build `cache.url`
//! 4. Well-known variables: `DATABASE_URL`, `REDIS_URL`, `RABBITMQ_URL`,
//!    `RABBITMQ_USER`, `RABBITMQ_PASSWORD`
//! 5. `CATALOG_`-prefixed variables, nested keys separated by `__`
//!    (e.g. `CATALOG_CACHE__TTL_SECS=30`)

use crate::config::AppConfig;
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
    DEFAULT_POSTGRES_HOST, DEFAULT_POSTGRES_PORT, DEFAULT_POSTGRES_USER, DEFAULT_REDIS_HOST,
    DEFAULT_REDIS_PORT, LEGACY_ENV_OVERRIDES, POSTGRES_ENV_VARS, REDIS_ENV_VARS,
};
use crate::error_ext::ErrorContext;
use crate::logging::log_config_loaded;
use catalog_domain::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::env;
use std::path::{Path, PathBuf};
use validator::Validate;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        match &self.config_path {
            Some(config_path) if config_path.exists() => {
                figment = figment.merge(Toml::file(config_path));
                log_config_loaded(config_path, true);
            }
            Some(config_path) => {
                return Err(Error::configuration(format!(
                    "Configuration file not found: {}",
                    config_path.display()
                )));
            }
            None => {
                if let Some(default_path) = Self::find_default_config_path() {
                    figment = figment.merge(Toml::file(&default_path));
                    log_config_loaded(&default_path, true);
                }
            }
        }

        for (key, url) in component_env_urls() {
            figment = figment.merge(Serialized::default(key, url));
        }

        figment = figment
            .merge(Self::legacy_env())
            .merge(
                Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
            );

        let app_config: AppConfig = figment
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;

        Ok(app_config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the explicit configuration file path
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Variables from the deployment environment that predate the prefix
    fn legacy_env() -> Env {
        let names: Vec<&str> = LEGACY_ENV_OVERRIDES.iter().map(|(name, _)| *name).collect();
        Env::raw().only(&names).map(|name| {
            LEGACY_ENV_OVERRIDES
                .iter()
                .find(|(legacy, _)| name == *legacy)
                .map_or_else(|| name.as_str().into(), |(_, key)| (*key).into())
        })
    }

    fn find_default_config_path() -> Option<PathBuf> {
        let current_dir = env::current_dir().ok()?;

        let candidates = [
            Some(current_dir.join(DEFAULT_CONFIG_FILENAME)),
            Some(
                current_dir
                    .join(DEFAULT_CONFIG_DIR)
                    .join(DEFAULT_CONFIG_FILENAME),
            ),
            dirs::config_dir().map(|d| d.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME)),
        ];

        candidates.into_iter().flatten().find(|path| path.exists())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Quote a value for a libpq key/value connection string
fn quote_conninfo(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Connection URLs assembled from per-component variables
///
/// Only produced when at least one variable of the group is set. The store
/// URL uses the key/value form so passwords need no percent-encoding.
pub fn component_env_urls() -> Vec<(&'static str, String)> {
    let mut urls = Vec::new();

    if POSTGRES_ENV_VARS.iter().any(|name| env_var(name).is_some()) {
        let host = env_var("POSTGRES_HOST").unwrap_or_else(|| DEFAULT_POSTGRES_HOST.to_string());
        let port = env_var("POSTGRES_PORT").unwrap_or_else(|| DEFAULT_POSTGRES_PORT.to_string());
        let user = env_var("POSTGRES_USER").unwrap_or_else(|| DEFAULT_POSTGRES_USER.to_string());
        let database = env_var("POSTGRES_DB").unwrap_or_else(|| user.clone());

        let mut parts = vec![("host", host), ("port", port), ("user", user)];
        if let Some(password) = env_var("POSTGRES_PASSWORD") {
            parts.push(("password", password));
        }
        parts.push(("dbname", database));

        let conninfo = parts
            .iter()
            .map(|(key, value)| format!("{key}={}", quote_conninfo(value)))
            .collect::<Vec<_>>()
            .join(" ");
        urls.push(("store.url", conninfo));
    }

    if REDIS_ENV_VARS.iter().any(|name| env_var(name).is_some()) {
        let host = env_var("REDIS_HOST").unwrap_or_else(|| DEFAULT_REDIS_HOST.to_string());
        let port = env_var("REDIS_PORT").unwrap_or_else(|| DEFAULT_REDIS_PORT.to_string());
        urls.push(("cache.url", format!("redis://{host}:{port}")));
    }

    urls
}

/// Validate application configuration
///
/// Field rules come from the `validator` derives; the checks below span
/// fields.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    config
        .validate()
        .config_context("Invalid configuration")?;

    require_url("store", "postgres", &config.store.provider, config.store.url.as_ref())?;
    require_url("cache", "redis", &config.cache.provider, config.cache.url.as_ref())?;
    require_url("queue", "amqp", &config.queue.provider, config.queue.url.as_ref())?;
    Ok(())
}

fn require_url(section: &str, needs_url: &str, provider: &str, url: Option<&String>) -> Result<()> {
    if provider == needs_url && url.is_none_or(|u| u.trim().is_empty()) {
        return Err(Error::configuration(format!(
            "{section}.url is required when {section}.provider = \"{provider}\""
        )));
    }
    Ok(())
}
