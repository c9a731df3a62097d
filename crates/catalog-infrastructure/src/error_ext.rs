//! Error extension utilities
//!
//! Context methods that convert foreign errors into the domain [`Error`]
//! type.

use catalog_domain::error::{Error, Result};
use std::fmt;

/// Extension trait for adding context to errors
///
/// # Example
///
/// ```ignore
/// use catalog_infrastructure::error_ext::ErrorContext;
///
/// let raw = std::fs::read_to_string(&path)
///     .with_context(|| format!("Failed to read {}", path.display()))?;
/// let config: AppConfig = figment.extract().config_context("Invalid configuration")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to a Result, converting the error to an internal error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context with lazy evaluation for expensive context creation
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Add context for configuration operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        Self: Sized;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::internal(format!("{context}: {err}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| Error::internal(format!("{}: {err}", f())))
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        Self: Sized,
    {
        self.map_err(|err| {
            Error::configuration_with_source(format!("{context}: {err}"), err)
        })
    }
}
