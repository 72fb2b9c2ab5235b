use rtcache_backend::{Backend, CacheBackend};
use rtcache_core::{CacheKey, CachePath};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cache::Cache;
use crate::error::CacheError;
use crate::metrics::{LookupResult, record_lookup};

/// What a lookup found.
#[derive(Debug)]
pub enum LookupOutcome<T> {
    /// Entry present and decoded.
    Hit(T),
    /// Entry absent or expired.
    Miss,
    /// The store failed or held an undecodable value. Callers proceed as on
    /// a miss; the error is only informational.
    Failed(CacheError),
}

/// Result of a read-through lookup: the key a later store must use, and
/// what was found under it.
#[derive(Debug)]
pub struct Lookup<T> {
    /// Key built for the request.
    pub key: CacheKey,
    /// Hit, miss or failure.
    pub outcome: LookupOutcome<T>,
}

impl<T> Lookup<T> {
    /// Whether a cached payload was found.
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, LookupOutcome::Hit(_))
    }

    /// The lookup error, if the store failed.
    pub fn error(&self) -> Option<&CacheError> {
        match &self.outcome {
            LookupOutcome::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Splits into key and payload, dropping the miss/failure distinction.
    pub fn into_parts(self) -> (CacheKey, Option<T>) {
        match self.outcome {
            LookupOutcome::Hit(payload) => (self.key, Some(payload)),
            LookupOutcome::Miss | LookupOutcome::Failed(_) => (self.key, None),
        }
    }
}

impl<B> Cache<B>
where
    B: Backend,
{
    /// Builds the key for `path` and looks it up.
    ///
    /// Never fails: store errors come back as [`LookupOutcome::Failed`] and
    /// are logged at `warn`. The cache state is not modified.
    pub async fn lookup<T>(&self, path: &CachePath) -> Lookup<T>
    where
        T: DeserializeOwned + Send,
    {
        self.lookup_key(path.key()).await
    }

    /// Looks up an already built key.
    pub async fn lookup_key<T>(&self, key: CacheKey) -> Lookup<T>
    where
        T: DeserializeOwned + Send,
    {
        let outcome = match self.backend.get::<T>(&key).await {
            Ok(Some(payload)) => {
                debug!(key = %key, "cache hit");
                record_lookup(key.namespace(), LookupResult::Hit);
                LookupOutcome::Hit(payload)
            }
            Ok(None) => {
                debug!(key = %key, "cache miss");
                record_lookup(key.namespace(), LookupResult::Miss);
                LookupOutcome::Miss
            }
            Err(error) => {
                warn!(key = %key, backend = %self.backend.label(), error = %error, "cache lookup failed, treating as miss");
                record_lookup(key.namespace(), LookupResult::Error);
                LookupOutcome::Failed(CacheError::Backend(error))
            }
        };
        Lookup { key, outcome }
    }
}
