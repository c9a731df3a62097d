//! Domain layer constants
//!
//! Values that are part of the catalog protocol itself. Infrastructure
//! defaults (ports, pool sizes, file names) live in
//! `catalog_infrastructure::constants`.

// ============================================================================
// CACHE PROTOCOL CONSTANTS
// ============================================================================

/// Cache key holding the serialized product collection snapshot
pub const PRODUCTS_CACHE_KEY: &str = "products";

/// Lifetime of the product snapshot in seconds
pub const PRODUCTS_CACHE_TTL_SECS: u64 = 60;

// ============================================================================
// QUEUE PROTOCOL CONSTANTS
// ============================================================================

/// Queue receiving product change events
pub const PRODUCT_QUEUE: &str = "product_queue";

/// In-flight deliveries per consumer
pub const CONSUMER_PREFETCH: u16 = 1;

/// Default capacity of the processed message log
pub const PROCESSED_LOG_CAPACITY: usize = 1000;
