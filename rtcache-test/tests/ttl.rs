use std::time::Duration;

use pretty_assertions::assert_eq;
use rtcache::{ApiResponse, Cache, CachePath};
use rtcache_moka::MokaBackend;
use rtcache_test::MockBackend;

#[tokio::test]
async fn entry_is_absent_after_ttl_without_explicit_delete() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone())
        .ttl(Duration::from_secs(300))
        .build();
    let path = CachePath::new("alias", "/alias/music-id").with_query("alias=x");

    cache
        .respond_and_cache(&path.key(), ApiResponse::ok(42u32))
        .await;

    backend.advance(Duration::from_secs(299));
    assert!(cache.lookup::<ApiResponse<u32>>(&path).await.is_hit());

    backend.advance(Duration::from_secs(1));
    let lookup = cache.lookup::<ApiResponse<u32>>(&path).await;
    assert!(!lookup.is_hit());
    assert!(lookup.error().is_none());
    assert_eq!(backend.remove_count(), 0);
}

#[tokio::test]
async fn rewrite_refreshes_payload_and_expiry() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone())
        .ttl(Duration::from_secs(60))
        .build();
    let key = CachePath::new("ns", "/items/1").key();

    cache.respond_and_cache(&key, ApiResponse::ok(1u32)).await;
    backend.advance(Duration::from_secs(50));
    cache.respond_and_cache(&key, ApiResponse::ok(2u32)).await;
    backend.advance(Duration::from_secs(50));

    let lookup = cache.lookup_key::<ApiResponse<u32>>(key).await;
    let (_, payload) = lookup.into_parts();
    assert_eq!(payload, Some(ApiResponse::ok(2)));
}

#[tokio::test]
async fn explicit_ttl_overrides_the_policy() {
    let backend = MockBackend::new();
    let cache = Cache::builder(backend.clone())
        .ttl(Duration::from_secs(300))
        .build();
    let key = CachePath::new("ns", "/items/1").key();

    cache
        .respond_and_cache_for(&key, ApiResponse::ok(1u32), Duration::from_secs(5))
        .await;

    assert_eq!(backend.ttl(key.as_str()), Some(Duration::from_secs(5)));
    backend.advance(Duration::from_secs(5));
    assert!(!backend.contains(key.as_str()));
}

#[tokio::test]
async fn moka_entry_expires_with_a_short_real_ttl() {
    let cache = Cache::builder(MokaBackend::builder(100).build())
        .ttl(Duration::from_millis(100))
        .build();
    let path = CachePath::new("ns", "/items/1");

    cache
        .respond_and_cache(&path.key(), ApiResponse::ok("x".to_owned()))
        .await;
    assert!(cache.lookup::<ApiResponse<String>>(&path).await.is_hit());

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!cache.lookup::<ApiResponse<String>>(&path).await.is_hit());
}
