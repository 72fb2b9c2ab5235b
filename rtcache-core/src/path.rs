//! The `(namespace, path, query)` triple a cached endpoint is addressed by.

use http::Uri;
use smol_str::SmolStr;

use crate::key::CacheKey;
use crate::pattern::KeyPattern;

/// Logical location of a cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CachePath {
    namespace: SmolStr,
    path: String,
    query: Option<String>,
}

impl CachePath {
    /// Creates a location without a query string.
    pub fn new(namespace: impl Into<SmolStr>, path: impl Into<String>) -> Self {
        CachePath {
            namespace: namespace.into(),
            path: path.into(),
            query: None,
        }
    }

    /// Sets the raw, still URL-encoded query string.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Takes path and raw query from a request URI.
    ///
    /// ```
    /// use http::Uri;
    /// use rtcache_core::CachePath;
    ///
    /// let uri: Uri = "/chunithm/alias/music-id?alias=abc".parse().unwrap();
    /// let path = CachePath::from_uri("chunithm-music-alias", &uri);
    /// assert_eq!(path.path(), "/chunithm/alias/music-id");
    /// assert_eq!(path.query(), Some("alias=abc"));
    /// ```
    pub fn from_uri(namespace: impl Into<SmolStr>, uri: &Uri) -> Self {
        CachePath {
            namespace: namespace.into(),
            path: uri.path().to_owned(),
            query: uri.query().map(str::to_owned),
        }
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the route path without query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Builds the cache key for this location.
    pub fn key(&self) -> CacheKey {
        CacheKey::exact(&self.namespace, &self.path, self.query.as_deref())
    }

    /// Builds the pattern matching every query variant of this path.
    pub fn pattern(&self) -> KeyPattern {
        KeyPattern::for_path(&self.namespace, &self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_without_query() {
        let uri: Uri = "/items/42".parse().unwrap();
        let path = CachePath::from_uri("items", &uri);
        assert_eq!(path.query(), None);
        assert_eq!(path.key().as_str(), "items:/items/42:query=none");
    }

    #[test]
    fn uri_query_order_does_not_matter() {
        let a: Uri = "/items?b=2&a=1".parse().unwrap();
        let b: Uri = "/items?a=1&b=2".parse().unwrap();
        assert_eq!(
            CachePath::from_uri("items", &a).key(),
            CachePath::from_uri("items", &b).key()
        );
    }

    #[test]
    fn builder_matches_uri() {
        let uri: Uri = "/items?page=2".parse().unwrap();
        assert_eq!(
            CachePath::new("items", "/items").with_query("page=2"),
            CachePath::from_uri("items", &uri)
        );
    }
}
