//! Tests for cache providers

use catalog_domain::ports::{CacheEntryConfig, CacheProvider};
use catalog_providers::cache::NullCacheProvider;
use std::time::Duration;

#[cfg(feature = "cache-moka")]
mod moka_tests {
    use super::*;
    use catalog_providers::cache::MokaCacheProvider;

    #[tokio::test]
    async fn test_set_then_get_returns_value() {
        let cache = MokaCacheProvider::new();
        cache
            .set_json("products", r#"[{"id":1}]"#, CacheEntryConfig::default())
            .await
            .unwrap();

        assert_eq!(
            cache.get_json("products").await.unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
        assert!(cache.exists("products").await.unwrap());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let cache = MokaCacheProvider::new();
        let config = CacheEntryConfig::default();
        cache.set_json("products", "[1]", config.clone()).await.unwrap();
        cache.set_json("products", "[1,2]", config).await.unwrap();

        assert_eq!(cache.get_json("products").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = MokaCacheProvider::new();
        cache
            .set_json("products", "[]", CacheEntryConfig::default())
            .await
            .unwrap();

        assert!(cache.delete("products").await.unwrap());
        assert!(!cache.delete("products").await.unwrap());
        assert!(cache.get_json("products").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_its_ttl() {
        let cache = MokaCacheProvider::new();
        let short = CacheEntryConfig::default().with_ttl(Duration::from_millis(100));
        cache.set_json("products", "[]", short).await.unwrap();
        cache
            .set_json("other", "[]", CacheEntryConfig::default())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(cache.get_json("products").await.unwrap().is_none());
        assert!(!cache.exists("products").await.unwrap());
        assert!(cache.exists("other").await.unwrap());
    }
}

#[tokio::test]
async fn test_null_cache_always_misses() {
    let cache = NullCacheProvider::new();
    cache
        .set_json("products", "[]", CacheEntryConfig::default())
        .await
        .unwrap();

    assert!(cache.get_json("products").await.unwrap().is_none());
    assert!(!cache.exists("products").await.unwrap());
    assert!(!cache.delete("products").await.unwrap());
    assert_eq!(cache.provider_name(), "null");
}
