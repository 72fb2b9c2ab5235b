use pretty_assertions::assert_eq;
use rtcache::{ApiResponse, Cache, CacheError, CachePath, InvalidationTarget};
use rtcache_backend::{BackendError, DeleteStatus};
use rtcache_test::{FailingBackend, MockBackend, Operation};

async fn populate<B: rtcache_backend::Backend>(cache: &Cache<B>, path: &CachePath) {
    cache.respond_and_cache(&path.key(), ApiResponse::ok(1u8)).await;
}

#[tokio::test]
async fn exact_invalidation_is_scoped() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    let item_1 = CachePath::new("ns", "/items/1");
    let item_2 = CachePath::new("ns", "/items/2");
    let item_1_v2 = CachePath::new("ns", "/items/1").with_query("v=2");
    for path in [&item_1, &item_2, &item_1_v2] {
        populate(&cache, path).await;
    }

    let status = cache.invalidate_exact("ns", "/items/1", None).await.unwrap();

    assert_eq!(status, DeleteStatus::Deleted(1));
    assert!(!backend.contains(item_1.key().as_str()));
    assert!(backend.contains(item_2.key().as_str()));
    assert!(backend.contains(item_1_v2.key().as_str()));
}

#[tokio::test]
async fn exact_invalidation_with_query_matches_any_parameter_order() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    let read = CachePath::new("alias", "/alias").with_query("page=2&tag=x");
    populate(&cache, &read).await;

    cache
        .invalidate_exact("alias", "/alias", Some("tag=x&page=2"))
        .await
        .unwrap();

    assert_eq!(backend.cache_entry_count(), 0);
}

#[tokio::test]
async fn empty_query_and_no_query_address_the_same_key() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    populate(&cache, &CachePath::new("ns", "/items/1")).await;

    let status = cache.invalidate_exact("ns", "/items/1", Some("")).await.unwrap();

    assert_eq!(status, DeleteStatus::Deleted(1));
}

#[tokio::test]
async fn wildcard_invalidation_removes_every_query_variant() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).scan_count(10).build();
    let variants: Vec<CachePath> = (0..57)
        .map(|page| CachePath::new("ns", "/items").with_query(format!("page={page}")))
        .chain([CachePath::new("ns", "/items")])
        .collect();
    for path in &variants {
        populate(&cache, path).await;
    }
    let detail = CachePath::new("ns", "/items/1");
    let other_ns = CachePath::new("other", "/items");
    populate(&cache, &detail).await;
    populate(&cache, &other_ns).await;

    let deleted = cache.invalidate_all_for_path("ns", "/items").await.unwrap();

    assert_eq!(deleted, 58);
    assert!(backend.scan_count() > 1);
    for path in &variants {
        assert!(!cache.lookup::<ApiResponse<u8>>(path).await.is_hit());
    }
    assert!(backend.contains(detail.key().as_str()));
    assert!(backend.contains(other_ns.key().as_str()));
}

#[tokio::test]
async fn small_scan_pages_still_reach_every_key() {
    let backend = MockBackend::new();
    backend.set_scan_page_limit(1);
    let cache = Cache::builder(backend.clone()).build();
    for page in 0..12 {
        populate(&cache, &CachePath::new("ns", "/list").with_query(format!("p={page}"))).await;
    }
    for id in 0..5 {
        populate(&cache, &CachePath::new("ns", format!("/list/{id}"))).await;
    }

    assert_eq!(cache.invalidate_all_for_path("ns", "/list").await.unwrap(), 12);
    assert_eq!(backend.cache_entry_count(), 5);
}

#[tokio::test]
async fn wildcard_does_not_widen_on_glob_characters_in_path() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    let literal = CachePath::new("ns", "/search/*");
    let sibling = CachePath::new("ns", "/search/all");
    populate(&cache, &literal).await;
    populate(&cache, &sibling).await;

    assert_eq!(cache.invalidate_all_for_path("ns", "/search/*").await.unwrap(), 1);
    assert!(backend.contains(sibling.key().as_str()));
}

#[tokio::test]
async fn deleting_missing_keys_is_not_an_error() {
    let cache = Cache::builder(MockBackend::new()).build();

    assert_eq!(
        cache.invalidate_exact("ns", "/items/404", None).await.unwrap(),
        DeleteStatus::Missing
    );
    assert_eq!(cache.invalidate_all_for_path("ns", "/nothing").await.unwrap(), 0);
}

#[tokio::test]
async fn exact_delete_failure_is_surfaced() {
    let backend = FailingBackend::new();
    backend.fail(Operation::Remove);
    let cache = Cache::builder(backend).build();

    let result = cache.invalidate_exact("ns", "/items/1", None).await;

    assert!(matches!(
        result,
        Err(CacheError::Backend(BackendError::ConnectionError(_)))
    ));
}

#[tokio::test]
async fn scan_failure_aborts_and_reports_partial_progress() {
    let backend = FailingBackend::new();
    backend.inner().set_scan_page_limit(5);
    let cache = Cache::builder(backend.clone()).build();
    for page in 0..20 {
        populate(&cache, &CachePath::new("ns", "/items").with_query(format!("page={page}"))).await;
    }
    backend.fail_scan_after(2);

    let error = cache
        .invalidate_all_for_path("ns", "/items")
        .await
        .unwrap_err();

    match error {
        CacheError::Scan { deleted, .. } => {
            assert_eq!(deleted, 10);
            assert_eq!(backend.inner().cache_entry_count(), 10);
        }
        other => panic!("expected scan error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalidate_all_continues_past_failures() {
    let backend = FailingBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    let detail = CachePath::new("ns", "/items/1");
    let listing = CachePath::new("ns", "/items").with_query("page=1");
    populate(&cache, &detail).await;
    populate(&cache, &listing).await;
    backend.fail(Operation::Scan);

    let result = cache
        .invalidate_all(&[
            InvalidationTarget::all_queries("ns", "/items"),
            InvalidationTarget::exact("ns", "/items/1"),
        ])
        .await;

    assert!(matches!(result, Err(CacheError::Scan { deleted: 0, .. })));
    assert!(!backend.inner().contains(detail.key().as_str()));
    assert!(backend.inner().contains(listing.key().as_str()));
}

#[tokio::test]
async fn invalidate_all_counts_removed_keys() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    populate(&cache, &CachePath::new("ns", "/items/1")).await;
    populate(&cache, &CachePath::new("ns", "/items").with_query("page=1")).await;
    populate(&cache, &CachePath::new("ns", "/items").with_query("page=2")).await;

    let deleted = cache
        .invalidate_all(&[
            InvalidationTarget::exact("ns", "/items/1"),
            InvalidationTarget::all_queries("ns", "/items"),
            InvalidationTarget::exact_with_query("ns", "/items", "page=1"),
        ])
        .await
        .unwrap();

    assert_eq!(deleted, 3);
    assert_eq!(backend.cache_entry_count(), 0);
}

#[tokio::test]
async fn commit_failure_skips_invalidation() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    let detail = CachePath::new("ns", "/items/1");
    populate(&cache, &detail).await;

    let result = cache
        .commit_then_invalidate(
            || async { Err::<(), _>("constraint violated") },
            &[InvalidationTarget::exact("ns", "/items/1")],
        )
        .await;

    assert!(matches!(result, Err("constraint violated")));
    assert!(backend.contains(detail.key().as_str()));
    assert_eq!(backend.remove_count(), 0);
}

#[tokio::test]
async fn committed_value_survives_failed_invalidation() {
    let backend = FailingBackend::new();
    backend.fail(Operation::Remove);
    let cache = Cache::builder(backend.clone()).build();

    let outcome = cache
        .commit_then_invalidate(
            || async { Ok::<_, String>(42u64) },
            &[InvalidationTarget::exact("ns", "/items/42")],
        )
        .await
        .unwrap();

    assert_eq!(outcome.value, 42);
    assert!(outcome.invalidation.is_err());
}

#[tokio::test]
async fn commit_runs_before_invalidation() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone()).build();
    let detail = CachePath::new("ns", "/items/1");
    populate(&cache, &detail).await;

    let outcome = cache
        .commit_then_invalidate(
            || async {
                assert!(backend.contains(detail.key().as_str()));
                Ok::<_, ()>("committed")
            },
            &[InvalidationTarget::exact("ns", "/items/1")],
        )
        .await
        .unwrap();

    assert_eq!(outcome.invalidation.unwrap(), 1);
    assert!(!backend.contains(detail.key().as_str()));
}
