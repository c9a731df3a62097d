//! Tests for the catalog service
//!
//! Covers the read-through listing, the store → invalidate → publish write
//! path and its failure modes.

use crate::support::{
    CallLog, Harness, PausingStore, RecordingCache, RecordingPublisher, RecordingStore,
    UnreachableCache, queued_json,
};
use catalog_application::queue::ProcessedMessageLog;
use catalog_application::{CatalogServiceImpl, CatalogServiceInterface};
use catalog_domain::constants::{PRODUCT_QUEUE, PRODUCTS_CACHE_KEY};
use catalog_domain::error::Error;
use catalog_domain::ports::{CacheProvider, ProductStore};
use catalog_domain::value_objects::{CacheStatus, Delivery, InvalidationOutcome};
use catalog_providers::cache::MokaCacheProvider;
use catalog_providers::store::InMemoryProductStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_create_widget_is_stored_invalidated_and_announced() {
    let h = Harness::connected().await;
    h.service.list_products().await.unwrap();
    assert!(h.cache.exists(PRODUCTS_CACHE_KEY).await.unwrap());

    let receipt = h.service.create_product("Widget", 9.99).await.unwrap();

    assert_eq!(receipt.product.id, 1);
    assert_eq!(receipt.product.name, "Widget");
    assert_eq!(receipt.invalidation, InvalidationOutcome::Invalidated);
    assert_eq!(h.store.get(1), Some(receipt.product.clone()));
    assert!(!h.cache.exists(PRODUCTS_CACHE_KEY).await.unwrap());
    assert_eq!(
        queued_json(&h.broker),
        vec![json!({"action": "add", "product": {"id": 1, "name": "Widget", "price": 9.99}})]
    );
}

#[tokio::test]
async fn test_list_misses_then_hits() {
    let h = Harness::connected().await;
    h.service.create_product("Widget", 9.99).await.unwrap();

    let first = h.service.list_products().await.unwrap();
    let second = h.service.list_products().await.unwrap();

    assert_eq!(first.cache_status, CacheStatus::Miss);
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(first.products, second.products);
    assert_eq!(second.products.len(), 1);
}

#[tokio::test]
async fn test_listing_serializes_with_cache_status() {
    let h = Harness::connected().await;
    let listing = h.service.list_products().await.unwrap();

    assert_eq!(
        serde_json::to_value(&listing).unwrap(),
        json!({"products": [], "cacheStatus": "miss"})
    );
}

#[tokio::test]
async fn test_list_after_write_is_never_stale() {
    let h = Harness::connected().await;
    h.service.create_product("Widget", 9.99).await.unwrap();
    assert_eq!(h.service.list_products().await.unwrap().cache_status, CacheStatus::Miss);

    h.service.update_product(1, "Widget", 12.5).await.unwrap();
    let listing = h.service.list_products().await.unwrap();

    assert_eq!(listing.cache_status, CacheStatus::Miss);
    assert!((listing.products[0].price - 12.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_read_overtaken_by_a_write_does_not_cache_old_rows() {
    let inner = Arc::new(InMemoryProductStore::with_products([("Old", 1.0)]));
    let store = Arc::new(PausingStore::new(Arc::clone(&inner)));
    let (listed, release) = (Arc::clone(&store.listed), Arc::clone(&store.release));
    let service = Arc::new(CatalogServiceImpl::new(
        store,
        Arc::new(MokaCacheProvider::new()),
        Arc::new(RecordingPublisher {
            calls: CallLog::default(),
        }),
        Arc::new(ProcessedMessageLog::new(4)),
    ));

    let reader = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.list_products().await }
    });
    listed.notified().await;
    service.create_product("New", 2.0).await.unwrap();
    release.notify_one();

    let stale = reader.await.unwrap().unwrap();
    assert_eq!(stale.products.len(), 1);

    let listing = service.list_products().await.unwrap();
    let names: Vec<_> = listing.products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(listing.cache_status, CacheStatus::Miss);
    assert_eq!(names, vec!["Old", "New"]);
    assert_eq!(service.list_products().await.unwrap().cache_status, CacheStatus::Hit);
}

#[tokio::test]
async fn test_snapshot_expires_after_its_ttl() {
    let store = Arc::new(InMemoryProductStore::with_products([("Widget", 9.99)]));
    let service = CatalogServiceImpl::new(
        store,
        Arc::new(MokaCacheProvider::new()),
        Arc::new(RecordingPublisher {
            calls: CallLog::default(),
        }),
        Arc::new(ProcessedMessageLog::new(4)),
    )
    .with_cache_ttl(Duration::from_millis(100));

    assert_eq!(service.list_products().await.unwrap().cache_status, CacheStatus::Miss);
    assert_eq!(service.list_products().await.unwrap().cache_status, CacheStatus::Hit);

    tokio::time::sleep(Duration::from_millis(250)).await;

    let expired = service.list_products().await.unwrap();
    assert_eq!(expired.cache_status, CacheStatus::Miss);
    assert_eq!(expired.products.len(), 1);
    assert_eq!(service.list_products().await.unwrap().cache_status, CacheStatus::Hit);
}

#[tokio::test]
async fn test_update_missing_product_has_no_side_effects() {
    let h = Harness::connected().await;
    h.service.list_products().await.unwrap();

    let err = h.service.update_product(99, "Ghost", 1.0).await.unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert!(h.cache.exists(PRODUCTS_CACHE_KEY).await.unwrap());
    assert_eq!(h.broker.queue_len(PRODUCT_QUEUE), 0);
}

#[tokio::test]
async fn test_delete_announces_only_the_id() {
    let h = Harness::connected().await;
    h.service.create_product("Widget", 9.99).await.unwrap();
    h.service.list_products().await.unwrap();

    let receipt = h.service.delete_product(1).await.unwrap();

    assert_eq!(receipt.product.name, "Widget");
    assert!(receipt.invalidation.is_confirmed());
    assert!(h.store.is_empty());
    assert!(!h.cache.exists(PRODUCTS_CACHE_KEY).await.unwrap());
    assert_eq!(
        queued_json(&h.broker).last(),
        Some(&json!({"action": "delete", "productId": 1}))
    );
}

#[tokio::test]
async fn test_delete_missing_product_is_not_found() {
    let h = Harness::connected().await;
    let err = h.service.delete_product(1).await.unwrap_err();

    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(h.broker.queue_len(PRODUCT_QUEUE), 0);
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_any_side_effect() {
    let h = Harness::connected().await;

    for (name, price) in [("", 1.0), ("   ", 1.0), ("Widget", 0.0), ("Widget", -3.0)] {
        let err = h.service.create_product(name, price).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{name:?}/{price}");
    }
    let err = h.service.update_product(1, "Widget", f64::NAN).await.unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    assert!(h.store.is_empty());
    assert!(!h.broker.has_queue(PRODUCT_QUEUE));
}

#[tokio::test]
async fn test_mutation_order_is_store_then_cache_then_publish() {
    let calls = CallLog::default();
    let service = CatalogServiceImpl::new(
        Arc::new(RecordingStore {
            inner: InMemoryProductStore::new(),
            calls: Arc::clone(&calls),
        }),
        Arc::new(RecordingCache {
            inner: MokaCacheProvider::new(),
            calls: Arc::clone(&calls),
        }),
        Arc::new(RecordingPublisher {
            calls: Arc::clone(&calls),
        }),
        Arc::new(ProcessedMessageLog::new(4)),
    );

    service.create_product("Widget", 9.99).await.unwrap();
    service.update_product(1, "Widget", 10.0).await.unwrap();
    service.delete_product(1).await.unwrap();

    assert_eq!(
        *calls.lock().unwrap(),
        vec![
            "store.insert",
            "cache.delete",
            "publish.add",
            "store.update",
            "cache.delete",
            "publish.update",
            "store.delete",
            "cache.delete",
            "publish.delete",
        ]
    );
}

#[tokio::test]
async fn test_unreachable_cache_degrades_reads_and_is_reported_on_writes() {
    let calls = CallLog::default();
    let store = Arc::new(InMemoryProductStore::with_products([("Widget", 9.99)]));
    let service = CatalogServiceImpl::new(
        Arc::clone(&store) as Arc<dyn ProductStore>,
        Arc::new(UnreachableCache),
        Arc::new(RecordingPublisher {
            calls: Arc::clone(&calls),
        }),
        Arc::new(ProcessedMessageLog::new(4)),
    );

    let listing = service.list_products().await.unwrap();
    assert_eq!(listing.cache_status, CacheStatus::Miss);
    assert_eq!(listing.products.len(), 1);

    let receipt = service.create_product("Gadget", 3.5).await.unwrap();
    assert!(matches!(
        receipt.invalidation,
        InvalidationOutcome::Failed { ref reason } if reason.contains("connection refused")
    ));
    assert_eq!(*calls.lock().unwrap(), vec!["publish.add"]);

    assert!(matches!(
        service.clear_cache().await,
        Err(Error::Cache { .. })
    ));
}

#[tokio::test]
async fn test_corrupt_snapshot_is_treated_as_miss() {
    let h = Harness::connected().await;
    h.cache
        .set_json(PRODUCTS_CACHE_KEY, "not json", Default::default())
        .await
        .unwrap();

    let listing = h.service.list_products().await.unwrap();

    assert_eq!(listing.cache_status, CacheStatus::Miss);
    assert_eq!(h.service.list_products().await.unwrap().cache_status, CacheStatus::Hit);
}

#[tokio::test]
async fn test_publish_failure_after_commit_is_surfaced() {
    let h = Harness::disconnected();

    let err = h.service.create_product("Widget", 9.99).await.unwrap_err();

    assert!(matches!(err, Error::QueueNotReady { .. }));
    // The store commit is not rolled back.
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn test_clear_cache_reports_whether_a_snapshot_existed() {
    let h = Harness::connected().await;
    h.service.list_products().await.unwrap();

    assert!(h.service.clear_cache().await.unwrap());
    assert!(!h.service.clear_cache().await.unwrap());
    assert_eq!(h.service.list_products().await.unwrap().cache_status, CacheStatus::Miss);
}

#[tokio::test]
async fn test_enqueue_raw_publishes_payload_verbatim() {
    let h = Harness::connected().await;
    let payload = json!({"name": "Resync", "price": 1.5});

    h.service.enqueue_raw(&payload).await.unwrap();

    assert_eq!(queued_json(&h.broker), vec![payload]);
}

#[tokio::test]
async fn test_enqueue_raw_rejects_empty_payloads() {
    let h = Harness::connected().await;

    for payload in [json!(null), json!({}), json!("  ")] {
        let err = h.service.enqueue_raw(&payload).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }), "{payload}");
    }
    assert_eq!(h.broker.queue_len(PRODUCT_QUEUE), 0);
}

#[tokio::test]
async fn test_processed_messages_reads_the_consumer_log() {
    let h = Harness::connected().await;
    assert!(h.service.processed_messages().is_empty());

    h.log.record(&Delivery {
        queue: PRODUCT_QUEUE.to_string(),
        delivery_tag: 1,
        body: br#"{"action":"delete","productId":1}"#.to_vec(),
        redelivered: false,
    });

    assert_eq!(
        h.service.processed_messages(),
        vec![r#"{"action":"delete","productId":1}"#.to_string()]
    );
}
