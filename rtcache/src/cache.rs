use std::fmt;
use std::time::Duration;

use rtcache_backend::Backend;

/// Default lifetime of a cached response.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default number of keys examined per `SCAN` step.
pub const DEFAULT_SCAN_COUNT: usize = 100;

/// Deployment-wide cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// TTL applied to every write-through store.
    pub ttl: Duration,
    /// `COUNT` hint for each wildcard invalidation scan step.
    pub scan_count: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy {
            ttl: DEFAULT_TTL,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }
}

/// Handle to the response cache.
///
/// Cheap to clone when the backend is, and meant to be injected into every
/// handler rather than held in a global. All operations go straight to the
/// backend; there is no in-process state and no request coalescing, so
/// concurrent misses for one key each compute and store.
#[derive(Clone)]
pub struct Cache<B> {
    pub(crate) backend: B,
    pub(crate) policy: CachePolicy,
}

impl<B> Cache<B>
where
    B: Backend,
{
    /// Creates a cache over `backend` with the given policy.
    pub fn new(backend: B, policy: CachePolicy) -> Self {
        Cache { backend, policy }
    }

    /// Starts a builder with the default policy.
    pub fn builder(backend: B) -> CacheBuilder<B> {
        CacheBuilder {
            backend,
            policy: CachePolicy::default(),
        }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the active policy.
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }
}

impl<B> fmt::Debug for Cache<B>
where
    B: Backend,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("backend", &self.backend.label())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Builder for [`Cache`].
pub struct CacheBuilder<B> {
    backend: B,
    policy: CachePolicy,
}

impl<B> CacheBuilder<B>
where
    B: Backend,
{
    /// Sets the TTL of write-through stores.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.policy.ttl = ttl;
        self
    }

    /// Sets the number of keys examined per scan step. Values below 1 are raised to 1.
    pub fn scan_count(mut self, scan_count: usize) -> Self {
        self.policy.scan_count = scan_count.max(1);
        self
    }

    /// Replaces the whole policy.
    pub fn policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the cache handle.
    pub fn build(self) -> Cache<B> {
        Cache::new(self.backend, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtcache_backend::{BackendResult, DeleteStatus, Raw, ScanPage};
    use rtcache_core::{CacheKey, KeyPattern};

    struct NullBackend;

    #[async_trait::async_trait]
    impl Backend for NullBackend {
        async fn read(&self, _key: &CacheKey) -> BackendResult<Option<Raw>> {
            Ok(None)
        }

        async fn write(&self, _key: &CacheKey, _value: Raw, _ttl: Option<Duration>) -> BackendResult<()> {
            Ok(())
        }

        async fn remove(&self, _key: &CacheKey) -> BackendResult<DeleteStatus> {
            Ok(DeleteStatus::Missing)
        }

        async fn remove_many(&self, _keys: &[String]) -> BackendResult<DeleteStatus> {
            Ok(DeleteStatus::Missing)
        }

        async fn scan(&self, _cursor: u64, _pattern: &KeyPattern, _count: usize) -> BackendResult<ScanPage> {
            Ok(ScanPage::default())
        }
    }

    #[test]
    fn default_policy() {
        let cache = Cache::builder(NullBackend).build();
        assert_eq!(cache.policy().ttl, Duration::from_secs(300));
        assert_eq!(cache.policy().scan_count, 100);
    }

    #[test]
    fn scan_count_is_at_least_one() {
        let cache = Cache::builder(NullBackend).scan_count(0).build();
        assert_eq!(cache.policy().scan_count, 1);
    }

    #[test]
    fn debug_shows_backend_label() {
        let cache = Cache::builder(NullBackend).build();
        assert!(format!("{cache:?}").contains("backend"));
    }
}
