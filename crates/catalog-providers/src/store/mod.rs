//! Record Store Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`PostgresProductStore`] | Persistent | `products` table through an r2d2 pool |
//! | [`InMemoryProductStore`] | Testing | Ordered map with store-assigned ids |

pub mod memory;
#[cfg(feature = "store-postgres")]
pub mod postgres;

pub use memory::InMemoryProductStore;
#[cfg(feature = "store-postgres")]
pub use postgres::PostgresProductStore;
