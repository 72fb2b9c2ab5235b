//! Simple in-memory test backend implementation using DashMap.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use rtcache_backend::{
    Backend, BackendError, BackendLabel, BackendResult, DeleteStatus, GlobMatcher, Raw, ScanPage,
};
use rtcache_core::{CacheKey, KeyPattern};

/// Simple in-memory backend for testing using DashMap.
///
/// TTLs are accepted and ignored.
#[derive(Clone, Default)]
pub struct TestBackend {
    store: Arc<DashMap<String, Raw>>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    pub fn insert_raw(&self, key: &str, value: &[u8]) {
        self.store.insert(key.to_owned(), Raw::copy_from_slice(value));
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }
}

#[async_trait]
impl Backend for TestBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        Ok(self.store.get(key.as_str()).map(|v| v.clone()))
    }

    async fn write(&self, key: &CacheKey, value: Raw, _ttl: Option<Duration>) -> BackendResult<()> {
        self.store.insert(key.as_str().to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        Ok(match self.store.remove(key.as_str()) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        let removed = keys
            .iter()
            .filter(|key| self.store.remove(key.as_str()).is_some())
            .count();
        Ok(DeleteStatus::from_count(removed as u64))
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        let matcher =
            GlobMatcher::new(pattern).map_err(|e| BackendError::InternalError(Box::new(e)))?;
        let snapshot: Vec<String> = self.store.iter().map(|entry| entry.key().clone()).collect();
        Ok(ScanPage::from_snapshot(snapshot, cursor, &matcher, count))
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("test")
    }
}
