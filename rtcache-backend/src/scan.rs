//! Cursor-based key enumeration.
//!
//! [`scan_keys`] drives [`Backend::scan`] from cursor `0` until the store
//! reports `0` again, yielding every page as it arrives. The stream is lazy:
//! nothing is sent to the store until it is polled, and dropping it stops the
//! iteration between steps.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use futures::Stream;
use futures::stream;
use rtcache_core::KeyPattern;

use crate::{Backend, BackendResult, GlobMatcher};

/// Result of a single scan step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next step, `0` when the iteration is complete.
    pub cursor: u64,
    /// Matching keys found in this step, possibly none.
    pub keys: Vec<String>,
}

impl ScanPage {
    /// Creates a page.
    pub fn new(cursor: u64, keys: Vec<String>) -> Self {
        ScanPage { cursor, keys }
    }

    /// Whether this was the final step.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.cursor == 0
    }

    /// Computes one scan step over a snapshot of an in-memory key set.
    ///
    /// Keys are visited in the order of a stable hash of their text, and the
    /// cursor is the hash position of the first key not visited yet. Keys
    /// deleted between steps therefore never shift the remaining ones, and
    /// a key present for the whole iteration is returned exactly once.
    ///
    /// Like Redis, `count` bounds the keys examined, not the keys returned:
    /// the pattern is applied after a key has been examined.
    pub fn from_snapshot<I>(keys: I, cursor: u64, matcher: &GlobMatcher, count: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut remaining: Vec<(u64, String)> = keys
            .into_iter()
            .map(|key| (scan_position(&key), key))
            .filter(|(position, _)| *position >= cursor)
            .collect();
        remaining.sort_unstable();

        let mut end = count.max(1).min(remaining.len());
        // keys sharing a position must land on the same page
        while end > 0 && end < remaining.len() && remaining[end].0 == remaining[end - 1].0 {
            end += 1;
        }
        let next = remaining.get(end).map_or(0, |(position, _)| *position);
        remaining.truncate(end);

        let keys = remaining
            .into_iter()
            .map(|(_, key)| key)
            .filter(|key| matcher.is_match(key))
            .collect();
        ScanPage::new(next, keys)
    }
}

/// Stable, non-zero position of a key in snapshot scan order.
fn scan_position(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish().max(1)
}

/// Scans all keys matching `pattern`, `count` keys examined per step.
pub fn scan_keys<B>(
    backend: &B,
    pattern: KeyPattern,
    count: usize,
) -> impl Stream<Item = BackendResult<ScanPage>> + Send + '_
where
    B: Backend + ?Sized,
{
    scan_keys_from(backend, pattern, count, 0)
}

/// Resumes a scan from a cursor previously returned by the store.
///
/// The stream ends after the first error.
pub fn scan_keys_from<B>(
    backend: &B,
    pattern: KeyPattern,
    count: usize,
    cursor: u64,
) -> impl Stream<Item = BackendResult<ScanPage>> + Send + '_
where
    B: Backend + ?Sized,
{
    stream::unfold(Some((cursor, pattern)), move |state| async move {
        let (cursor, pattern) = state?;
        let step = backend.scan(cursor, &pattern, count).await;
        let next = match &step {
            Ok(page) if !page.is_complete() => Some((page.cursor, pattern)),
            _ => None,
        };
        Some((step, next))
    })
}
