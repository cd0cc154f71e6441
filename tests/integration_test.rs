//! Integration tests for catalog-cache
//!
//! These tests verify end-to-end request behavior across all components.

use catalog_cache::backend::CacheBackend;
use catalog_cache::{
    CacheStatus, CacheStore, Error, InMemoryInventoryStore, InventoryQuery, QueryExecutor,
    RequestCoordinator, StoreRow,
};
use chrono::NaiveDate;
use std::time::Duration;

const TTL: Duration = Duration::from_millis(60_000);

fn row(code: &str, name: &str, color: &str, group: &str, date: (i32, u32, u32)) -> StoreRow {
    StoreRow {
        code: Some(format!("{}   ", code)),
        name: Some(name.to_string()),
        color_description: Some(color.to_string()),
        group_code: Some("07".to_string()),
        group_name: Some(format!("{}  ", group)),
        creation_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        unit: Some(12.0),
        on_hand: Some(2.5),
        reserved: Some(0.25),
        available: Some(2.25),
        future: Some(1.0),
        composition: Some("CUERO".to_string()),
    }
}

fn catalog() -> InMemoryInventoryStore {
    InMemoryInventoryStore::with_rows(vec![
        row("BRUNO-100", "Mocasin", "NEGRO", "CALZADOS MASCULINOS", (2024, 1, 10)),
        row("BRUNO-200", "Bota", "CAFE", "CALZADOS MASCULINOS", (2024, 2, 10)),
        row("ENZO-100", "Sandalia", "AZUL", "CALZADOS MASCULINOS", (2024, 3, 10)),
        row("MAX-100", "Tenis", "BLANCO", "CALZADOS MASCULINOS", (2024, 4, 10)),
        row("BOL-100", "Bolso", "ROJO", "CARTERAS", (2024, 1, 20)),
        row("FEM-100", "Tacon", "NEGRO", "CALZADOS FEMENINOS", (2024, 5, 1)),
    ])
}

fn coordinator(store: &InMemoryInventoryStore) -> RequestCoordinator<InMemoryInventoryStore> {
    RequestCoordinator::new(CacheStore::in_memory(TTL), QueryExecutor::new(store.clone()))
}

fn query(pairs: &[(&str, &str)]) -> InventoryQuery {
    let mut query = InventoryQuery::default();
    for (name, value) in pairs {
        let value = Some(value.to_string());
        match *name {
            "group" => query.group = value,
            "groups" => query.groups = value,
            "dateStart" => query.date_start = value,
            "dateEnd" => query.date_end = value,
            "search" => query.search = value,
            "subcat" => query.subcat = value,
            "page" => query.page = value,
            "pageSize" => query.page_size = value,
            other => panic!("unknown parameter {}", other),
        }
    }
    query
}

fn codes(response: &catalog_cache::InventoryResponse) -> Vec<&str> {
    response.data.iter().map(|r| r.code.as_str()).collect()
}

/// Test 1: End-to-End Request Flow
///
/// - First request misses, queries the store, normalizes and caches
/// - Second request with the same coarse filter hits with identical data
#[tokio::test]
async fn test_end_to_end_request_flow() {
    let store = catalog();
    let coordinator = coordinator(&store);
    let q = query(&[("group", "CARTERAS")]);

    let first = coordinator.handle(&q).await.expect("First request should succeed");
    assert_eq!(first.cache, CacheStatus::Miss);
    assert_eq!(codes(&first), vec!["BOL-100"]);

    let record = &first.data[0];
    assert_eq!(record.group_name, "CARTERAS");
    assert_eq!(record.on_hand, 30.0);
    assert_eq!(record.reserved, 3.0);
    assert_eq!(record.available, 27.0);
    assert_eq!(record.future, 12.0);

    let cached = coordinator
        .cache()
        .backend()
        .get(&first.base_key)
        .await
        .expect("Cache get should not error");
    assert!(cached.is_some(), "Cache should be populated after first call");

    let second = coordinator.handle(&q).await.expect("Second request should succeed");
    assert_eq!(second.cache, CacheStatus::Hit);
    assert_eq!(second.data, first.data);
    assert_eq!(store.query_count(), 1);
}

/// Test 2: Cache-Key Independence
///
/// Requests differing only in fine filters share one partition.
#[tokio::test]
async fn test_fine_filters_do_not_partition() {
    let store = catalog();
    let coordinator = coordinator(&store);

    let base = coordinator
        .handle(&query(&[("group", "CALZADOS MASCULINOS")]))
        .await
        .expect("Request should succeed");
    let searched = coordinator
        .handle(&query(&[("group", "CALZADOS MASCULINOS"), ("search", "bota")]))
        .await
        .expect("Request should succeed");
    let sub_lined = coordinator
        .handle(&query(&[("group", "CALZADOS MASCULINOS"), ("subcat", "enzo")]))
        .await
        .expect("Request should succeed");

    assert_eq!(base.base_key, searched.base_key);
    assert_eq!(base.base_key, sub_lined.base_key);
    assert_eq!(searched.cache, CacheStatus::Hit);
    assert_eq!(sub_lined.cache, CacheStatus::Hit);
    assert_eq!(codes(&searched), vec!["BRUNO-200"]);
    assert_eq!(codes(&sub_lined), vec!["ENZO-100"]);
    assert_eq!(store.query_count(), 1);
}

/// Test 3: TTL Expiry
///
/// After the TTL elapses the next request misses and re-queries the store.
#[tokio::test(start_paused = true)]
async fn test_ttl_expiry() {
    let store = catalog();
    let coordinator = coordinator(&store);
    let q = query(&[("group", "CARTERAS")]);

    coordinator.handle(&q).await.expect("Request should succeed");

    tokio::time::advance(TTL).await;
    let still_fresh = coordinator.handle(&q).await.expect("Request should succeed");
    assert_eq!(still_fresh.cache, CacheStatus::Hit);

    tokio::time::advance(Duration::from_millis(1)).await;
    let expired = coordinator.handle(&q).await.expect("Request should succeed");
    assert_eq!(expired.cache, CacheStatus::Miss);
    assert_eq!(store.query_count(), 2);
}

/// Test 4: Sub-line Gating
///
/// BRUNO narrows the masculine footwear group and is a no-op elsewhere.
#[tokio::test]
async fn test_sub_line_gating() {
    let store = catalog();
    let coordinator = coordinator(&store);

    let masculine = coordinator
        .handle(&query(&[("group", "CALZADOS MASCULINOS"), ("subcat", "BRUNO")]))
        .await
        .expect("Request should succeed");
    assert_eq!(codes(&masculine), vec!["BRUNO-100", "BRUNO-200"]);

    let other = coordinator
        .handle(&query(&[("group", "CARTERAS"), ("subcat", "BRUNO")]))
        .await
        .expect("Request should succeed");
    assert_eq!(codes(&other), vec!["BOL-100"]);

    let listed = coordinator
        .handle(&query(&[
            ("groups", "CARTERAS,CALZADOS MASCULINOS"),
            ("subcat", "bruno"),
        ]))
        .await
        .expect("Request should succeed");
    assert_eq!(codes(&listed), vec!["BRUNO-100", "BRUNO-200"]);
}

/// Test 5: Search Is OR Across Fields
#[tokio::test]
async fn test_search_matches_any_field() {
    let store = catalog();
    let coordinator = coordinator(&store);

    let by_code = coordinator
        .handle(&query(&[("search", "max-")]))
        .await
        .expect("Request should succeed");
    let by_name = coordinator
        .handle(&query(&[("search", "SANDALIA")]))
        .await
        .expect("Request should succeed");
    let by_color = coordinator
        .handle(&query(&[("search", "negro")]))
        .await
        .expect("Request should succeed");

    assert_eq!(codes(&by_code), vec!["MAX-100"]);
    assert_eq!(codes(&by_name), vec!["ENZO-100"]);
    assert_eq!(codes(&by_color), vec!["BRUNO-100", "FEM-100"]);
}

/// Test 6: Group List Precedence
///
/// `groups=A,B` wins over `group=C`, and both spellings share a key.
#[tokio::test]
async fn test_group_list_precedence() {
    let store = catalog();
    let coordinator = coordinator(&store);

    let both = coordinator
        .handle(&query(&[
            ("groups", "CARTERAS,CALZADOS FEMENINOS"),
            ("group", "CALZADOS MASCULINOS"),
        ]))
        .await
        .expect("Request should succeed");
    assert_eq!(codes(&both), vec!["BOL-100", "FEM-100"]);

    let list_only = coordinator
        .handle(&query(&[("groups", "CARTERAS,CALZADOS FEMENINOS")]))
        .await
        .expect("Request should succeed");
    assert_eq!(list_only.base_key, both.base_key);
    assert_eq!(list_only.cache, CacheStatus::Hit);
}

/// Test 7: Date Range
///
/// Inclusive bounds; a single bound is ignored; dates partition the cache.
#[tokio::test]
async fn test_date_range_filter() {
    let store = catalog();
    let coordinator = coordinator(&store);

    let ranged = coordinator
        .handle(&query(&[("dateStart", "2024-01-10"), ("dateEnd", "2024-02-10")]))
        .await
        .expect("Request should succeed");
    assert_eq!(codes(&ranged), vec!["BOL-100", "BRUNO-100", "BRUNO-200"]);

    let half_open = coordinator
        .handle(&query(&[("dateStart", "2024-03-01")]))
        .await
        .expect("Request should succeed");
    assert_eq!(half_open.total, 6);
    assert_ne!(half_open.base_key, ranged.base_key);

    let malformed = coordinator
        .handle(&query(&[("dateStart", "ayer"), ("dateEnd", "2024-12-31")]))
        .await
        .expect("Malformed dates are not a request error");
    assert_eq!(malformed.total, 0);
}

/// Test 8: Concurrent Misses Coalesce
#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_coalesce() {
    let store = catalog().with_latency(Duration::from_millis(200));
    let coordinator = coordinator(&store);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let coordinator = coordinator.clone();
            let search = if i % 2 == 0 { "bruno" } else { "enzo" };
            tokio::spawn(async move {
                coordinator
                    .handle(&query(&[("group", "CALZADOS MASCULINOS"), ("search", search)]))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let response = handle
            .await
            .expect("Task should not panic")
            .expect("Request should succeed");
        assert_eq!(response.cache, CacheStatus::Miss);
    }

    assert_eq!(store.query_count(), 1);
    assert_eq!(coordinator.in_flight(), 0);
}

/// Test 9: Store Failure
///
/// A failed load surfaces `StoreUnavailable`, caches nothing and leaves no
/// stale data to fall back on.
#[tokio::test(start_paused = true)]
async fn test_store_failure_is_terminal() {
    let store = catalog();
    let coordinator = coordinator(&store);
    let q = query(&[("group", "CARTERAS")]);

    coordinator.handle(&q).await.expect("Request should succeed");
    tokio::time::advance(TTL + Duration::from_millis(1)).await;

    store.fail_with("connection reset");
    match coordinator.handle(&q).await {
        Err(Error::StoreUnavailable(msg)) => assert!(msg.contains("connection reset")),
        other => panic!("Expected StoreUnavailable, got {:?}", other.map(|r| r.total)),
    }

    store.recover();
    let recovered = coordinator.handle(&q).await.expect("Request should succeed");
    assert_eq!(recovered.cache, CacheStatus::Miss);
    assert_eq!(store.query_count(), 3);
}

/// Test 10: Pagination
#[tokio::test]
async fn test_pagination() {
    let store = catalog();
    let coordinator = coordinator(&store);

    let page = coordinator
        .handle(&query(&[
            ("group", "CALZADOS MASCULINOS"),
            ("page", "2"),
            ("pageSize", "3"),
        ]))
        .await
        .expect("Request should succeed");
    assert_eq!(page.total, 4);
    assert_eq!(codes(&page), vec!["MAX-100"]);

    let bad = coordinator
        .handle(&query(&[("group", "CALZADOS MASCULINOS"), ("page", "x")]))
        .await
        .expect("Malformed page is not a request error");
    assert_eq!(bad.total, 4);
    assert!(bad.data.is_empty());
    assert_eq!(bad.cache, CacheStatus::Hit);
}

/// Test 11: Explicit Cache Teardown
#[tokio::test]
async fn test_cache_clear_forces_miss() {
    let store = catalog();
    let coordinator = coordinator(&store);
    let q = query(&[("group", "CARTERAS")]);

    let first = coordinator.handle(&q).await.expect("Request should succeed");
    coordinator
        .cache()
        .invalidate(&first.base_key)
        .await
        .expect("Invalidate should succeed");

    let second = coordinator.handle(&q).await.expect("Request should succeed");
    assert_eq!(second.cache, CacheStatus::Miss);

    coordinator.cache().clear().await.expect("Clear should succeed");
    let third = coordinator.handle(&q).await.expect("Request should succeed");
    assert_eq!(third.cache, CacheStatus::Miss);
    assert_eq!(store.query_count(), 3);
}
