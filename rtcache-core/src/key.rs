//! Cache key construction.
//!
//! Every cached response lives under
//!
//! ```text
//! {namespace}:{path}:query={digest}
//! ```
//!
//! where `digest` is the literal `none` for an empty canonical query and
//! otherwise the hex-encoded MD5 of [`canonicalize`]'s output. The digest keeps
//! keys bounded no matter how long the query string is.
//!
//! ```
//! use rtcache_core::CacheKey;
//!
//! let key = CacheKey::build("pjsk-binding", "/pjsk/qq/user/1/binding", "server=jp");
//! assert_eq!(key.namespace(), "pjsk-binding");
//! assert_eq!(key.path(), "/pjsk/qq/user/1/binding");
//! assert_eq!(key.digest().to_string().len(), 32);
//! ```
//!
//! [`CacheKey`] wraps its data in an `Arc`, cloning it is a reference count
//! bump.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use md5::{Digest, Md5};
use smol_str::SmolStr;

use crate::query::{CanonicalQuery, canonicalize};

/// Digest token used when the canonical query is empty.
pub const NO_QUERY: &str = "none";

/// Query component of a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryDigest {
    /// The request had no (or an empty) query string.
    None,
    /// MD5 of the canonical query string.
    Md5([u8; 16]),
}

impl QueryDigest {
    /// Hashes a canonical query, mapping the empty form to [`QueryDigest::None`].
    pub fn of(query: &CanonicalQuery) -> Self {
        if query.is_empty() {
            return QueryDigest::None;
        }
        let digest = Md5::digest(query.as_str().as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&digest);
        QueryDigest::Md5(bytes)
    }
}

impl fmt::Display for QueryDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryDigest::None => f.write_str(NO_QUERY),
            QueryDigest::Md5(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

#[derive(Debug)]
struct CacheKeyInner {
    namespace: SmolStr,
    path: String,
    digest: QueryDigest,
    rendered: String,
}

/// A fully rendered cache key.
///
/// Equality and hashing use the rendered string only.
#[derive(Clone)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl CacheKey {
    /// Builds the key a read of `path?raw_query` in `namespace` uses.
    pub fn build(namespace: &str, path: &str, raw_query: &str) -> Self {
        Self::from_digest(namespace, path, QueryDigest::of(&canonicalize(raw_query)))
    }

    /// Builds a key from an optional raw query.
    ///
    /// `None` and `Some("")` both produce the `none` digest, so invalidation
    /// always targets the same key a matching read would have built.
    pub fn exact(namespace: &str, path: &str, raw_query: Option<&str>) -> Self {
        Self::build(namespace, path, raw_query.unwrap_or_default())
    }

    /// Builds a key from an already computed digest.
    pub fn from_digest(namespace: &str, path: &str, digest: QueryDigest) -> Self {
        let rendered = format!("{namespace}:{path}:query={digest}");
        CacheKey {
            inner: Arc::new(CacheKeyInner {
                namespace: SmolStr::new(namespace),
                path: path.to_owned(),
                digest,
                rendered,
            }),
        }
    }

    /// Returns the rendered key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner.rendered
    }

    /// Returns the namespace component.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    /// Returns the route path component.
    #[inline]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// Returns the query digest component.
    #[inline]
    pub fn digest(&self) -> QueryDigest {
        self.inner.digest
    }
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.rendered == other.inner.rendered
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.rendered.hash(state);
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.inner.rendered).finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.rendered)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
