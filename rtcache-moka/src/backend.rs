//! Moka backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use rtcache_backend::{
    Backend, BackendError, BackendLabel, BackendResult, DeleteStatus, GlobMatcher, Raw, ScanPage,
};
use rtcache_core::{CacheKey, KeyPattern};
use tracing::trace;

use crate::builder::MokaBackendBuilder;

/// Stored value together with the TTL it was written with.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) data: Raw,
    pub(crate) ttl: Option<Duration>,
}

/// In-memory cache backend powered by Moka.
///
/// Entries expire individually after the TTL they were written with, and a
/// rewrite replaces both value and TTL. Expired entries are never returned,
/// even before Moka's background eviction removes them.
///
/// ```
/// use rtcache_moka::MokaBackend;
///
/// let backend = MokaBackend::builder(10_000).build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted**, the cache is lost on process restart
/// - Data is **not shared** across processes, use Redis for distributed caching
/// - Every `scan` step snapshots and sorts the whole cache, so a wildcard
///   invalidation over `N` entries costs `O(N² / count)`. Fine for local
///   development and small caches, use Redis for large key spaces
#[derive(Clone)]
pub struct MokaBackend {
    pub(crate) cache: Cache<String, Entry>,
    pub(crate) label: BackendLabel,
}

impl std::fmt::Debug for MokaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaBackend")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl MokaBackend {
    /// Creates a new builder with the specified maximum number of entries.
    ///
    /// When the cache reaches capacity, the least recently used entries are
    /// evicted.
    pub fn builder(max_capacity: u64) -> MokaBackendBuilder {
        MokaBackendBuilder::new(max_capacity)
    }
}

#[async_trait]
impl Backend for MokaBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        trace!(key = %key, "moka get");
        Ok(self.cache.get(key.as_str()).await.map(|entry| entry.data))
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        trace!(key = %key, ?ttl, "moka insert");
        self.cache
            .insert(key.as_str().to_owned(), Entry { data: value, ttl })
            .await;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.cache.remove(key.as_str()).await {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        let mut deleted = 0u64;
        for key in keys {
            if self.cache.remove(key.as_str()).await.is_some() {
                deleted += 1;
            }
        }
        Ok(DeleteStatus::from_count(deleted))
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        let matcher =
            GlobMatcher::new(pattern).map_err(|e| BackendError::InternalError(Box::new(e)))?;
        let snapshot: Vec<String> = self.cache.iter().map(|(key, _)| key.as_ref().clone()).collect();
        trace!(cursor, pattern = %pattern, size = snapshot.len(), "moka scan");
        Ok(ScanPage::from_snapshot(snapshot, cursor, &matcher, count))
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }
}
