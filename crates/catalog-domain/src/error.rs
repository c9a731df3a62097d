//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by transport-level variants
type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for the catalog service
#[derive(Error, Debug)]
pub enum Error {
    /// Mutation input rejected by business validation
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the rejected input
        message: String,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Backing store operation failed
    #[error("Store error: {message}")]
    Store {
        /// Description of the store error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Cache transport unavailable or cache operation failed
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Publish or consume attempted before a channel was established
    #[error("Queue not ready: {message}")]
    QueueNotReady {
        /// Description of the missing precondition
        message: String,
    },

    /// Queue connection or channel failure
    #[error("Queue transport error: {message}")]
    QueueTransport {
        /// Description of the transport error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A consumer handler failed to process a delivery
    #[error("Handler error: {message}")]
    Handler {
        /// Description of the handler failure
        message: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Business rule error creation methods
impl Error {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a handler error
    pub fn handler<S: Into<String>>(message: S) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }
}

// Store error creation methods
impl Error {
    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source
    pub fn store_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Cache error creation methods
impl Error {
    /// Create a cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
            source: None,
        }
    }

    /// Create a cache error with source
    pub fn cache_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Cache {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Queue error creation methods
impl Error {
    /// Create a queue-not-ready error
    pub fn queue_not_ready<S: Into<String>>(message: S) -> Self {
        Self::QueueNotReady {
            message: message.into(),
        }
    }

    /// Create a queue transport error
    pub fn queue_transport<S: Into<String>>(message: S) -> Self {
        Self::QueueTransport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a queue transport error with source
    pub fn queue_transport_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::QueueTransport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error came from the queue transport
    ///
    /// Covers both broker rejections and lost connections; callers tell them
    /// apart by checking whether the channel is still open.
    pub fn is_queue_transport(&self) -> bool {
        matches!(self, Self::QueueTransport { .. })
    }
}

// Configuration and internal error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
