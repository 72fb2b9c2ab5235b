#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track lookups by namespace and result (`hit`, `miss`, `error`).
    pub static ref LOOKUP_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rtcache_lookup_total",
            "Total number of cache lookups."
        );
        "rtcache_lookup_total"
    };
    /// Track failed write-through stores.
    pub static ref STORE_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rtcache_store_errors_total",
            "Total number of write-through stores that failed."
        );
        "rtcache_store_errors_total"
    };
    /// Track keys removed by invalidation, by namespace and kind (`exact`, `wildcard`).
    pub static ref INVALIDATED_KEYS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rtcache_invalidated_keys_total",
            "Total number of cache keys removed by invalidation."
        );
        "rtcache_invalidated_keys_total"
    };
    /// Track failed invalidations.
    pub static ref INVALIDATION_ERROR_COUNTER: &'static str = {
        metrics::describe_counter!(
            "rtcache_invalidation_errors_total",
            "Total number of invalidations that failed or stopped part way."
        );
        "rtcache_invalidation_errors_total"
    };
}

/// Lookup result label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResult {
    /// Entry found and decoded.
    Hit,
    /// Entry absent.
    Miss,
    /// Store or decode failure.
    Error,
}

impl LookupResult {
    /// Label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupResult::Hit => "hit",
            LookupResult::Miss => "miss",
            LookupResult::Error => "error",
        }
    }
}

/// Invalidation kind label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationKind {
    /// Single key.
    Exact,
    /// Scan and delete.
    Wildcard,
}

impl InvalidationKind {
    /// Label value.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationKind::Exact => "exact",
            InvalidationKind::Wildcard => "wildcard",
        }
    }
}

#[cfg(feature = "metrics")]
pub(crate) fn record_lookup(namespace: &str, result: LookupResult) {
    metrics::counter!(
        *LOOKUP_COUNTER,
        "namespace" => namespace.to_owned(),
        "result" => result.as_str()
    )
    .increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_lookup(_namespace: &str, _result: LookupResult) {}

#[cfg(feature = "metrics")]
pub(crate) fn record_store_error(namespace: &str) {
    metrics::counter!(*STORE_ERROR_COUNTER, "namespace" => namespace.to_owned()).increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_store_error(_namespace: &str) {}

#[cfg(feature = "metrics")]
pub(crate) fn record_invalidated(namespace: &str, kind: InvalidationKind, deleted: u64) {
    metrics::counter!(
        *INVALIDATED_KEYS_COUNTER,
        "namespace" => namespace.to_owned(),
        "kind" => kind.as_str()
    )
    .increment(deleted);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_invalidated(_namespace: &str, _kind: InvalidationKind, _deleted: u64) {}

#[cfg(feature = "metrics")]
pub(crate) fn record_invalidation_error(namespace: &str, kind: InvalidationKind) {
    metrics::counter!(
        *INVALIDATION_ERROR_COUNTER,
        "namespace" => namespace.to_owned(),
        "kind" => kind.as_str()
    )
    .increment(1);
}

#[cfg(not(feature = "metrics"))]
#[inline]
pub(crate) fn record_invalidation_error(_namespace: &str, _kind: InvalidationKind) {}
