//! Product listing read results

use crate::entities::Product;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a listing was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the cached snapshot
    Hit,
    /// Read from the store and written back to the cache
    Miss,
}

impl CacheStatus {
    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{products, cacheStatus}` result of listing the catalog
///
/// `products` is either entirely the cached snapshot or entirely a fresh
/// store read, never a mix of both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    /// Products in store order
    pub products: Vec<Product>,
    /// Provenance of `products`
    pub cache_status: CacheStatus,
}

impl ProductListing {
    /// Listing served from the cache
    pub fn hit(products: Vec<Product>) -> Self {
        Self {
            products,
            cache_status: CacheStatus::Hit,
        }
    }

    /// Listing read from the store
    pub fn miss(products: Vec<Product>) -> Self {
        Self {
            products,
            cache_status: CacheStatus::Miss,
        }
    }
}
