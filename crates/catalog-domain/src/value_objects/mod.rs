//! Domain Value Objects
//!
//! Immutable values exchanged between the catalog service and its
//! collaborators.
//!
//! | Value Object | Description |
//! |--------------|-------------|
//! | [`ProductListing`] | Read result tagged with its cache provenance |
//! | [`MutationReceipt`] | Write result with the cache invalidation outcome |
//! | [`Delivery`] | A queue message as handed to a consumer |
//! | [`ProcessedMessage`] | Entry of the consumer's processed message log |
//! | [`QueueState`] | Lifecycle state of a queue channel |

/// Read results
pub mod listing;
/// Write results
pub mod mutation;
/// Queue deliveries and channel state
pub mod queue;

pub use listing::{CacheStatus, ProductListing};
pub use mutation::{InvalidationOutcome, MutationReceipt};
pub use queue::{Delivery, ProcessedMessage, QueueState};
