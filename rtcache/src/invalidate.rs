use std::future::Future;
use std::pin::pin;

use futures::StreamExt;
use rtcache_backend::{Backend, CacheBackend, DeleteStatus, scan_keys};
use rtcache_core::{CacheKey, InvalidationTarget, KeyPattern};
use tracing::{debug, error, trace};

use crate::cache::Cache;
use crate::error::CacheError;
use crate::metrics::{InvalidationKind, record_invalidated, record_invalidation_error};

/// Result of [`Cache::commit_then_invalidate`].
///
/// The committed value is always returned, even when invalidation failed.
#[derive(Debug)]
pub struct MutationOutcome<T> {
    /// Value produced by the commit.
    pub value: T,
    /// Number of keys removed, or the first invalidation error.
    pub invalidation: Result<u64, CacheError>,
}

impl<B> Cache<B>
where
    B: Backend,
{
    /// Deletes the key a read of `(namespace, path, raw_query)` would use.
    ///
    /// `None` and `Some("")` both address the `query=none` key. A missing
    /// key is not an error.
    pub async fn invalidate_exact(
        &self,
        namespace: &str,
        path: &str,
        raw_query: Option<&str>,
    ) -> Result<DeleteStatus, CacheError> {
        self.invalidate_key(&CacheKey::exact(namespace, path, raw_query))
            .await
    }

    /// Deletes one key.
    pub async fn invalidate_key(&self, key: &CacheKey) -> Result<DeleteStatus, CacheError> {
        match self.backend.delete(key).await {
            Ok(status) => {
                debug!(key = %key, deleted = status.count(), "exact invalidation");
                record_invalidated(key.namespace(), InvalidationKind::Exact, status.count());
                Ok(status)
            }
            Err(source) => {
                error!(key = %key, backend = %self.backend.label(), error = %source, "exact invalidation failed");
                record_invalidation_error(key.namespace(), InvalidationKind::Exact);
                Err(CacheError::Backend(source))
            }
        }
    }

    /// Deletes every key of `path` in `namespace`, whatever its query string.
    ///
    /// Walks the store one bounded `SCAN` step at a time and deletes each
    /// step's matches before requesting the next. Returns the number of keys
    /// removed. Keys stored after the scan started may be missed.
    pub async fn invalidate_all_for_path(
        &self,
        namespace: &str,
        path: &str,
    ) -> Result<u64, CacheError> {
        let pattern = KeyPattern::for_path(namespace, path);
        match self.delete_matching(&pattern).await {
            Ok(deleted) => {
                debug!(namespace, path, deleted, "wildcard invalidation");
                record_invalidated(namespace, InvalidationKind::Wildcard, deleted);
                Ok(deleted)
            }
            Err(err) => {
                error!(
                    namespace,
                    path,
                    deleted = err.deleted(),
                    backend = %self.backend.label(),
                    error = %err,
                    "wildcard invalidation incomplete"
                );
                record_invalidated(namespace, InvalidationKind::Wildcard, err.deleted());
                record_invalidation_error(namespace, InvalidationKind::Wildcard);
                Err(err)
            }
        }
    }

    async fn delete_matching(&self, pattern: &KeyPattern) -> Result<u64, CacheError> {
        let mut deleted = 0;
        let mut pages = pin!(scan_keys(
            &self.backend,
            pattern.clone(),
            self.policy.scan_count
        ));
        while let Some(page) = pages.next().await {
            let page = page.map_err(|source| CacheError::Scan { deleted, source })?;
            trace!(cursor = page.cursor, matched = page.keys.len(), "scan step");
            if page.keys.is_empty() {
                continue;
            }
            let status = self
                .backend
                .remove_many(&page.keys)
                .await
                .map_err(|source| CacheError::Scan { deleted, source })?;
            deleted += status.count();
        }
        Ok(deleted)
    }

    /// Applies one invalidation target, returning the number of keys removed.
    pub async fn invalidate(&self, target: &InvalidationTarget) -> Result<u64, CacheError> {
        match target {
            InvalidationTarget::Exact(path) => {
                self.invalidate_key(&path.key()).await.map(|status| status.count())
            }
            InvalidationTarget::AllQueries { namespace, path } => {
                self.invalidate_all_for_path(namespace, path).await
            }
        }
    }

    /// Applies every target, continuing past failures.
    ///
    /// Returns the total number of keys removed, or the first error. Every
    /// failure is logged at `error`.
    pub async fn invalidate_all(&self, targets: &[InvalidationTarget]) -> Result<u64, CacheError> {
        let mut deleted = 0;
        let mut first_error = None;
        for target in targets {
            match self.invalidate(target).await {
                Ok(count) => deleted += count,
                Err(err) => {
                    deleted += err.deleted();
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(deleted),
        }
    }

    /// Runs `commit` and, only if it succeeds, applies `targets`.
    ///
    /// A failed commit is returned untouched and nothing is invalidated.
    /// A failed invalidation does not hide the committed value; it is
    /// reported in [`MutationOutcome::invalidation`].
    pub async fn commit_then_invalidate<T, E, F, Fut>(
        &self,
        commit: F,
        targets: &[InvalidationTarget],
    ) -> Result<MutationOutcome<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let value = commit().await?;
        let invalidation = self.invalidate_all(targets).await;
        Ok(MutationOutcome {
            value,
            invalidation,
        })
    }
}
