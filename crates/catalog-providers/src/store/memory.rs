//! In-memory product store
//!
//! Ids start at 1 and are never reused, like a database sequence.

use async_trait::async_trait;
use catalog_domain::entities::{Product, ProductDraft};
use catalog_domain::error::Result;
use catalog_domain::ports::ProductStore;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug)]
struct Rows {
    products: BTreeMap<i64, Product>,
    next_id: i64,
}

/// Product store held in process memory
///
/// Every mutation takes the write lock, so concurrent updates to the same id
/// are serialized.
#[derive(Debug)]
pub struct InMemoryProductStore {
    rows: RwLock<Rows>,
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Rows {
                products: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Create a store pre-populated with `products` (ids assigned in order)
    pub fn with_products<'a>(products: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let store = Self::new();
        {
            let mut rows = store.write();
            for (name, price) in products {
                let id = rows.next_id;
                rows.next_id += 1;
                rows.products.insert(
                    id,
                    Product {
                        id,
                        name: name.to_string(),
                        price,
                    },
                );
            }
        }
        store
    }

    /// Look up a single row
    pub fn get(&self, id: i64) -> Option<Product> {
        self.read().products.get(&id).cloned()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.read().products.len()
    }

    /// Whether the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Rows> {
        self.rows
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Rows> {
        self.rows
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, draft: &ProductDraft) -> Result<Product> {
        let mut rows = self.write();
        let id = rows.next_id;
        rows.next_id += 1;
        let product = Product::from_draft(id, draft);
        rows.products.insert(id, product.clone());
        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.read().products.values().cloned().collect())
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> Result<Option<Product>> {
        let mut rows = self.write();
        Ok(rows.products.get_mut(&id).map(|row| {
            *row = Product::from_draft(id, draft);
            row.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.write().products.remove(&id))
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

use catalog_application::ports::registry::{
    STORE_PROVIDERS, StoreProviderConfig, StoreProviderEntry,
};

#[linkme::distributed_slice(STORE_PROVIDERS)]
static MEMORY_STORE: StoreProviderEntry = StoreProviderEntry {
    name: "memory",
    description: "In-process product store (tests and demos)",
    factory: |_: &StoreProviderConfig| Ok(Arc::new(InMemoryProductStore::new())),
};
