use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use rtcache_core::{CacheKey, KeyPattern};
use serde::{Serialize, de::DeserializeOwned};

use crate::{BackendError, BackendLabel, DeleteStatus, JsonFormat, Raw, ScanPage};

pub type BackendResult<T> = Result<T, BackendError>;

/// Raw operations of the backing key-value store.
///
/// Every method is a single round-trip. Implementations must make each
/// single-key operation atomic and must never block the store when scanning:
/// one `scan` call is one bounded step.
#[async_trait]
pub trait Backend: Sync + Send {
    /// `GET key`. Expired entries are reported as `None`.
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>>;

    /// `SET key value` with optional TTL. Always a full overwrite.
    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()>;

    /// `DEL key`. A missing key is [`DeleteStatus::Missing`], not an error.
    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus>;

    /// `DEL key1 key2 ...` for raw keys returned by [`Backend::scan`].
    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus>;

    /// One `SCAN cursor MATCH pattern COUNT count` step.
    ///
    /// Cursor `0` starts an iteration; a returned cursor of `0` ends it.
    /// A page may be empty while the iteration is still running.
    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage>;

    /// Returns the label of this backend for logs and metrics.
    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("backend")
    }
}

#[async_trait]
impl Backend for &dyn Backend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        (*self).write(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (*self).remove(key).await
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        (*self).remove_many(keys).await
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        (*self).scan(cursor, pattern, count).await
    }

    fn label(&self) -> BackendLabel {
        (*self).label()
    }
}

#[async_trait]
impl Backend for Box<dyn Backend> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        (**self).write(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        (**self).remove_many(keys).await
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        (**self).scan(cursor, pattern, count).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }
}

#[async_trait]
impl Backend for Arc<dyn Backend + Send + 'static> {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        (**self).write(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        (**self).remove(key).await
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        (**self).remove_many(keys).await
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        (**self).scan(cursor, pattern, count).await
    }

    fn label(&self) -> BackendLabel {
        (**self).label()
    }
}

/// High-level cache backend trait with typed operations.
///
/// Values are encoded with [`JsonFormat`] so that anything the HTTP client
/// would receive can be stored and read back unchanged.
pub trait CacheBackend: Backend {
    /// Reads and decodes a value.
    ///
    /// A stored value that does not decode is reported as
    /// [`BackendError::FormatError`].
    fn get<T>(&self, key: &CacheKey) -> impl Future<Output = BackendResult<Option<T>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            match self.read(key).await? {
                Some(raw) => Ok(Some(JsonFormat.deserialize(&raw)?)),
                None => Ok(None),
            }
        }
    }

    /// Encodes and stores a value.
    fn set<T>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: Option<Duration>,
    ) -> impl Future<Output = BackendResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let raw = JsonFormat.serialize(value)?;
            self.write(key, raw, ttl).await
        }
    }

    /// Deletes a single key.
    fn delete(&self, key: &CacheKey) -> impl Future<Output = BackendResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

impl<B> CacheBackend for B where B: Backend + ?Sized {}
