//! What a write endpoint asks to have removed from the cache.

use smol_str::SmolStr;

use crate::key::CacheKey;
use crate::path::CachePath;
use crate::pattern::KeyPattern;

/// An invalidation request issued after a committed mutation.
///
/// Use [`Exact`](InvalidationTarget::Exact) when the affected read has one
/// known query shape (usually a detail view of the mutated id). Use
/// [`AllQueries`](InvalidationTarget::AllQueries) for listing endpoints whose
/// cached query variants are unknown or unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InvalidationTarget {
    /// One key: namespace, path and a specific query string.
    Exact(CachePath),
    /// Every key under namespace and path, whatever the query string.
    AllQueries {
        /// Namespace of the endpoint family.
        namespace: SmolStr,
        /// Route path without query string.
        path: String,
    },
}

impl InvalidationTarget {
    /// Exact target without a query string (digest `none`).
    pub fn exact(namespace: impl Into<SmolStr>, path: impl Into<String>) -> Self {
        InvalidationTarget::Exact(CachePath::new(namespace, path))
    }

    /// Exact target for one specific raw query string.
    pub fn exact_with_query(
        namespace: impl Into<SmolStr>,
        path: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        InvalidationTarget::Exact(CachePath::new(namespace, path).with_query(query))
    }

    /// Wildcard target covering all query variants of a path.
    pub fn all_queries(namespace: impl Into<SmolStr>, path: impl Into<String>) -> Self {
        InvalidationTarget::AllQueries {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Returns the namespace the target lives in.
    pub fn namespace(&self) -> &str {
        match self {
            InvalidationTarget::Exact(path) => path.namespace(),
            InvalidationTarget::AllQueries { namespace, .. } => namespace,
        }
    }

    /// Returns the route path of the target.
    pub fn path(&self) -> &str {
        match self {
            InvalidationTarget::Exact(path) => path.path(),
            InvalidationTarget::AllQueries { path, .. } => path,
        }
    }

    /// Returns the single key of an exact target.
    pub fn key(&self) -> Option<CacheKey> {
        match self {
            InvalidationTarget::Exact(path) => Some(path.key()),
            InvalidationTarget::AllQueries { .. } => None,
        }
    }

    /// Returns the scan pattern of a wildcard target.
    pub fn pattern(&self) -> Option<KeyPattern> {
        match self {
            InvalidationTarget::Exact(_) => None,
            InvalidationTarget::AllQueries { namespace, path } => {
                Some(KeyPattern::for_path(namespace, path))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_target_key() {
        let target = InvalidationTarget::exact_with_query("alias", "/alias/music-id", "alias=x");
        assert_eq!(
            target.key(),
            Some(CacheKey::build("alias", "/alias/music-id", "alias=x"))
        );
        assert_eq!(target.pattern(), None);
    }

    #[test]
    fn wildcard_target_pattern() {
        let target = InvalidationTarget::all_queries("binding", "/user/1/binding");
        assert_eq!(target.key(), None);
        assert_eq!(
            target.pattern().map(|p| p.to_string()),
            Some("binding:/user/1/binding:query=*".to_owned())
        );
        assert_eq!(target.namespace(), "binding");
        assert_eq!(target.path(), "/user/1/binding");
    }
}
