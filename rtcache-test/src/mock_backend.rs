use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use rtcache_backend::{
    Backend, BackendError, BackendLabel, BackendResult, DeleteStatus, GlobMatcher, Raw, ScanPage,
};
use rtcache_core::{CacheKey, KeyPattern};

use crate::clock::ManualClock;

#[derive(Debug, Default)]
pub struct BackendCounters {
    pub read_count: AtomicUsize,
    pub read_hit_count: AtomicUsize,
    pub read_miss_count: AtomicUsize,
    pub write_count: AtomicUsize,
    pub remove_count: AtomicUsize,
    pub scan_count: AtomicUsize,
}

impl BackendCounters {
    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn read_hit_count(&self) -> usize {
        self.read_hit_count.load(Ordering::SeqCst)
    }

    pub fn read_miss_count(&self) -> usize {
        self.read_miss_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn remove_count(&self) -> usize {
        self.remove_count.load(Ordering::SeqCst)
    }

    pub fn scan_count(&self) -> usize {
        self.scan_count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.read_count.store(0, Ordering::SeqCst);
        self.read_hit_count.store(0, Ordering::SeqCst);
        self.read_miss_count.store(0, Ordering::SeqCst);
        self.write_count.store(0, Ordering::SeqCst);
        self.remove_count.store(0, Ordering::SeqCst);
        self.scan_count.store(0, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct StoredEntry {
    data: Raw,
    expires_at: Option<Duration>,
}

/// In-memory backend with counters and a manual clock.
///
/// Entries expire when the clock passes their TTL. A scan step examines at
/// most the requested `COUNT` keys, further capped by
/// [`set_scan_page_limit`](MockBackend::set_scan_page_limit).
#[derive(Clone, Debug)]
pub struct MockBackend {
    store: Arc<DashMap<String, StoredEntry>>,
    pub counters: Arc<BackendCounters>,
    clock: ManualClock,
    scan_page_limit: Arc<AtomicUsize>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with_clock(ManualClock::new())
    }

    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            store: Arc::new(DashMap::new()),
            counters: Arc::new(BackendCounters::default()),
            clock,
            scan_page_limit: Arc::new(AtomicUsize::new(usize::MAX)),
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Moves the clock forward, expiring entries whose TTL has passed.
    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub fn set_scan_page_limit(&self, limit: usize) {
        self.scan_page_limit.store(limit.max(1), Ordering::SeqCst);
    }

    pub fn read_count(&self) -> usize {
        self.counters.read_count()
    }

    pub fn read_hit_count(&self) -> usize {
        self.counters.read_hit_count()
    }

    pub fn read_miss_count(&self) -> usize {
        self.counters.read_miss_count()
    }

    pub fn write_count(&self) -> usize {
        self.counters.write_count()
    }

    pub fn remove_count(&self) -> usize {
        self.counters.remove_count()
    }

    pub fn scan_count(&self) -> usize {
        self.counters.scan_count()
    }

    pub fn reset_counters(&self) {
        self.counters.reset();
    }

    /// Number of live entries.
    pub fn cache_entry_count(&self) -> usize {
        self.live_keys().len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.store
            .get(key)
            .is_some_and(|entry| !self.is_expired(&entry))
    }

    /// Live keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.live_keys();
        keys.sort();
        keys
    }

    /// Remaining lifetime of a live entry, `None` if absent or stored without TTL.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let entry = self.store.get(key)?;
        if self.is_expired(&entry) {
            return None;
        }
        entry
            .expires_at
            .map(|at| at.saturating_sub(self.clock.now()))
    }

    /// Stores bytes directly, bypassing counters.
    pub fn insert_raw(&self, key: &str, data: impl Into<Raw>, ttl: Option<Duration>) {
        let entry = StoredEntry {
            data: data.into(),
            expires_at: ttl.map(|ttl| self.clock.now() + ttl),
        };
        self.store.insert(key.to_owned(), entry);
    }

    fn is_expired(&self, entry: &StoredEntry) -> bool {
        entry
            .expires_at
            .is_some_and(|at| at <= self.clock.now())
    }

    fn live_keys(&self) -> Vec<String> {
        self.store
            .iter()
            .filter(|entry| !self.is_expired(entry.value()))
            .map(|entry| entry.key().clone())
            .collect()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        self.counters.read_count.fetch_add(1, Ordering::SeqCst);
        let result = match self.store.get(key.as_str()) {
            Some(entry) if !self.is_expired(&entry) => Some(entry.data.clone()),
            _ => None,
        };
        if result.is_some() {
            self.counters.read_hit_count.fetch_add(1, Ordering::SeqCst);
        } else {
            self.store
                .remove_if(key.as_str(), |_, entry| self.is_expired(entry));
            self.counters.read_miss_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(result)
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        self.counters.write_count.fetch_add(1, Ordering::SeqCst);
        self.insert_raw(key.as_str(), value, ttl);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        self.counters.remove_count.fetch_add(1, Ordering::SeqCst);
        match self.store.remove(key.as_str()) {
            Some((_, entry)) if !self.is_expired(&entry) => Ok(DeleteStatus::Deleted(1)),
            _ => Ok(DeleteStatus::Missing),
        }
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        self.counters.remove_count.fetch_add(1, Ordering::SeqCst);
        let deleted = keys
            .iter()
            .filter_map(|key| self.store.remove(key.as_str()))
            .filter(|(_, entry)| !self.is_expired(entry))
            .count();
        Ok(DeleteStatus::from_count(deleted as u64))
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        self.counters.scan_count.fetch_add(1, Ordering::SeqCst);
        let matcher =
            GlobMatcher::new(pattern).map_err(|e| BackendError::InternalError(Box::new(e)))?;
        let count = count.min(self.scan_page_limit.load(Ordering::SeqCst));
        Ok(ScanPage::from_snapshot(
            self.live_keys(),
            cursor,
            &matcher,
            count,
        ))
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("mock")
    }
}
