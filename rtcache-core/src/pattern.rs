//! Glob patterns for wildcard invalidation.
//!
//! Patterns follow Redis `SCAN ... MATCH` syntax. Namespace and path are
//! escaped before the trailing `*` is appended, so a route that happens to
//! contain `*`, `?` or `[` only ever matches its own keys.

use std::fmt;

/// A Redis-style glob selecting cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPattern {
    raw: String,
}

impl KeyPattern {
    /// Pattern matching every query variant of `path` in `namespace`:
    /// `{namespace}:{path}:query=*`.
    pub fn for_path(namespace: &str, path: &str) -> Self {
        KeyPattern {
            raw: format!("{}:{}:query=*", escape(namespace), escape(path)),
        }
    }

    /// Wraps an already formed glob.
    pub fn from_glob(raw: impl Into<String>) -> Self {
        KeyPattern { raw: raw.into() }
    }

    /// Returns the glob text sent to the store.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Backslash-escapes glob metacharacters.
pub fn escape(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());
    for ch in literal.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
