//! Mutation write results

use crate::entities::Product;
use serde::{Deserialize, Serialize};

/// Result of invalidating the product snapshot after a store commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InvalidationOutcome {
    /// The snapshot key is confirmed absent
    Invalidated,
    /// The cache could not confirm removal; a stale snapshot may survive
    /// until its TTL expires
    Failed {
        /// Cache error description
        reason: String,
    },
}

impl InvalidationOutcome {
    /// Whether the cache confirmed the invalidation
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Invalidated)
    }
}

/// Product returned by a create, update or delete, plus the cache outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationReceipt {
    /// The product as committed (or as it was before deletion)
    pub product: Product,
    /// Whether the product snapshot was invalidated
    pub invalidation: InvalidationOutcome,
}
