use rtcache_backend::BackendError;
use thiserror::Error;

/// Error of a cache operation surfaced to the caller.
///
/// Read-path failures are reported through
/// [`LookupOutcome::Failed`](crate::LookupOutcome::Failed) and write-through
/// failures are logged and dropped, so in practice callers meet this type on
/// invalidation.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store rejected or failed a single operation.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Wildcard invalidation stopped part way. Keys deleted before the
    /// failing step stay deleted.
    #[error("wildcard invalidation aborted after deleting {deleted} keys: {source}")]
    Scan {
        /// Keys removed before the failure.
        deleted: u64,
        /// Failure of the scan step or of the batch delete.
        source: BackendError,
    },
}

impl CacheError {
    /// Number of keys removed before the failure, `0` for single-key errors.
    pub fn deleted(&self) -> u64 {
        match self {
            CacheError::Backend(_) => 0,
            CacheError::Scan { deleted, .. } => *deleted,
        }
    }
}
