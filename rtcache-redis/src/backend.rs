//! Redis backend implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{Client, aio::ConnectionManager};
use rtcache_backend::{
    Backend, BackendError, BackendLabel, BackendResult, DeleteStatus, Raw, ScanPage,
};
use rtcache_core::{CacheKey, KeyPattern};
use tokio::sync::OnceCell;
use tracing::trace;

use crate::error::Error;

/// Redis cache backend based on redis-rs crate.
///
/// It uses a [`ConnectionManager`] for asynchronous network interaction,
/// created on first use.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
#[derive(Clone)]
pub struct RedisBackend {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    label: BackendLabel,
}

impl RedisBackend {
    /// Create new backend instance connecting to `redis://127.0.0.1/`.
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates new RedisBackend builder with default settings.
    #[must_use]
    pub fn builder() -> RedisBackendBuilder {
        RedisBackendBuilder::default()
    }

    /// Create lazy connection to redis via [`ConnectionManager`]
    pub async fn connection(&self) -> Result<&ConnectionManager, BackendError> {
        trace!("Get connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("Initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }
}

/// Part of builder pattern implementation for RedisBackend.
pub struct RedisBackendBuilder {
    connection_info: String,
    label: BackendLabel,
}

impl Default for RedisBackendBuilder {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            label: BackendLabel::new_static("redis"),
        }
    }
}

impl RedisBackendBuilder {
    /// Set connection info (host, port, database, password) for RedisBackend.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Set a custom label used in logs and metrics.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Create new instance of Redis backend with passed settings.
    ///
    /// Only the URL is validated here, the connection is opened on first use.
    pub fn build(self) -> Result<RedisBackend, Error> {
        Ok(RedisBackend {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            label: self.label,
        })
    }
}

/// `PX` argument; Redis rejects a zero expiry.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl Backend for RedisBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        let mut con = self.connection().await?.clone();
        trace!(key = %key, "GET");
        let data: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(data.map(Bytes::from))
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        let mut con = self.connection().await?.clone();
        trace!(key = %key, ?ttl, "SET");
        let mut cmd = redis::cmd("SET");
        cmd.arg(key.as_str()).arg(value.as_ref());
        if let Some(ttl) = ttl {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }
        cmd.query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        let mut con = self.connection().await?.clone();
        trace!(key = %key, "DEL");
        let deleted: u64 = redis::cmd("DEL")
            .arg(key.as_str())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(DeleteStatus::from_count(deleted))
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        if keys.is_empty() {
            return Ok(DeleteStatus::Missing);
        }
        let mut con = self.connection().await?.clone();
        trace!(count = keys.len(), "DEL batch");
        let deleted: u64 = redis::cmd("DEL")
            .arg(keys)
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(DeleteStatus::from_count(deleted))
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        let mut con = self.connection().await?.clone();
        trace!(cursor, pattern = %pattern, count, "SCAN");
        let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern.as_str())
            .arg("COUNT")
            .arg(count.max(1))
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(ScanPage::new(next, keys))
    }

    fn label(&self) -> BackendLabel {
        self.label.clone()
    }
}
