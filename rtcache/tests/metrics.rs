//! Tests for verifying metrics correctness.

#![cfg(feature = "metrics")]

use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use metrics_util::{CompositeKey, MetricKind};
use rtcache::{ApiResponse, Cache, CachePath};
use rtcache_moka::MokaBackend;

/// Type alias for snapshot entries
type SnapshotEntry = (
    CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
);

/// Find a counter by name and one label pair.
fn find_counter(entries: &[SnapshotEntry], name: &str, label: (&str, &str)) -> Option<u64> {
    for (key, _, _, value) in entries {
        if key.kind() == MetricKind::Counter && key.key().name() == name {
            for pair in key.key().labels() {
                if pair.key() == label.0
                    && pair.value() == label.1
                    && let DebugValue::Counter(v) = *value
                {
                    return Some(v);
                }
            }
        }
    }
    None
}

#[test]
fn lookup_and_invalidation_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        // Single-threaded runtime so all async code runs on the recorder's thread
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let cache = Cache::builder(MokaBackend::builder(100).build()).build();
            let path = CachePath::new("metrics-ns", "/items").with_query("page=1");

            cache.lookup::<ApiResponse<u8>>(&path).await;
            cache.respond_and_cache(&path.key(), ApiResponse::ok(1u8)).await;
            cache.lookup::<ApiResponse<u8>>(&path).await;
            cache
                .invalidate_all_for_path("metrics-ns", "/items")
                .await
                .unwrap();
        })
    });

    let entries = snapshotter.snapshot().into_vec();

    assert_eq!(
        find_counter(&entries, "rtcache_lookup_total", ("result", "miss")),
        Some(1)
    );
    assert_eq!(
        find_counter(&entries, "rtcache_lookup_total", ("result", "hit")),
        Some(1)
    );
    assert_eq!(
        find_counter(&entries, "rtcache_invalidated_keys_total", ("kind", "wildcard")),
        Some(1)
    );
}
