use std::future::Future;
use std::time::Duration;

use rtcache_backend::{Backend, CacheBackend};
use rtcache_core::{CacheKey, CachePath};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{trace, warn};

use crate::cache::Cache;
use crate::error::CacheError;
use crate::lookup::LookupOutcome;
use crate::metrics::record_store_error;

impl<B> Cache<B>
where
    B: Backend,
{
    /// Stores `payload` under `key` for `ttl`, overwriting any previous entry.
    pub async fn store<T>(&self, key: &CacheKey, payload: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize + Sync,
    {
        trace!(key = %key, ?ttl, "cache store");
        self.backend.set(key, payload, Some(ttl)).await?;
        Ok(())
    }

    /// Stores `payload` with the configured TTL and hands it back.
    ///
    /// A failed store is logged and dropped; the payload is returned either way.
    pub async fn respond_and_cache<T>(&self, key: &CacheKey, payload: T) -> T
    where
        T: Serialize + Sync,
    {
        self.respond_and_cache_for(key, payload, self.policy.ttl).await
    }

    /// [`respond_and_cache`](Self::respond_and_cache) with an explicit TTL.
    pub async fn respond_and_cache_for<T>(&self, key: &CacheKey, payload: T, ttl: Duration) -> T
    where
        T: Serialize + Sync,
    {
        if let Err(error) = self.store(key, &payload, ttl).await {
            warn!(key = %key, backend = %self.backend.label(), error = %error, "cache store failed");
            record_store_error(key.namespace());
        }
        payload
    }

    /// Full read-through flow.
    ///
    /// Returns the cached payload on a hit. On a miss, or when the lookup
    /// failed, runs `compute`, stores its result and returns it.
    pub async fn get_or_compute<T, F, Fut>(&self, path: &CachePath, compute: F) -> T
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let lookup = self.lookup::<T>(path).await;
        match lookup.outcome {
            LookupOutcome::Hit(payload) => payload,
            LookupOutcome::Miss | LookupOutcome::Failed(_) => {
                let payload = compute().await;
                self.respond_and_cache(&lookup.key, payload).await
            }
        }
    }

    /// Read-through flow for fallible computations. Errors are returned
    /// without being cached.
    pub async fn get_or_try_compute<T, E, F, Fut>(&self, path: &CachePath, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let lookup = self.lookup::<T>(path).await;
        match lookup.outcome {
            LookupOutcome::Hit(payload) => Ok(payload),
            LookupOutcome::Miss | LookupOutcome::Failed(_) => {
                let payload = compute().await?;
                Ok(self.respond_and_cache(&lookup.key, payload).await)
            }
        }
    }
}
