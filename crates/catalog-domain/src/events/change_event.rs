//! Product change events
//!
//! One event is produced for every successful store mutation and announced on
//! the product queue. Consumers receive it at least once.

use crate::entities::Product;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Change notification published after a committed store mutation
///
/// Serialized with an `action` tag:
///
/// ```text
/// {"action":"add","product":{"id":1,"name":"Widget","price":9.99}}
/// {"action":"update","product":{"id":1,"name":"Widget","price":12.5}}
/// {"action":"delete","productId":1}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ChangeEvent {
    /// A product was inserted
    Add {
        /// The product as committed
        product: Product,
    },
    /// A product was updated
    Update {
        /// The product after the update
        product: Product,
    },
    /// A product was deleted
    Delete {
        /// Identifier of the removed product
        #[serde(rename = "productId")]
        product_id: i64,
    },
}

impl ChangeEvent {
    /// Action tag as it appears on the wire
    pub fn action(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    /// Identifier of the affected product
    pub fn product_id(&self) -> i64 {
        match self {
            Self::Add { product } | Self::Update { product } => product.id,
            Self::Delete { product_id } => *product_id,
        }
    }

    /// Serialize to the queue message body
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse a queue message body
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}
