//! Query string canonicalization.
//!
//! Two requests that carry the same multiset of `key=value` pairs must land on
//! the same cache entry no matter how the client ordered them. [`canonicalize`]
//! parses the raw query, sorts pairs by key and then by value, and joins them
//! back with `&`:
//!
//! ```
//! use rtcache_core::canonicalize;
//!
//! assert_eq!(canonicalize("b=2&a=1&a=0").as_str(), "a=0&a=1&b=2");
//! assert_eq!(canonicalize("").as_str(), "");
//! ```
//!
//! Values are compared as text, so `1` and `01` stay distinct. Tokens are
//! emitted decoded, except that `%`, `&`, `=` and control bytes are
//! percent-encoded again, so `a=x%26b%3D2` and `a=x&b=2` stay distinct.
//!
//! ## Malformed input
//!
//! A query that cannot be parsed (bad percent escape, `;` separator, or
//! escapes that decode to invalid UTF-8) is not an error. The raw string is
//! returned as [`CanonicalQuery::Fallback`], which still hashes to a stable
//! key but gives no permutation guarantee.

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode, utf8_percent_encode};
use thiserror::Error;
use tracing::debug;

/// Bytes re-encoded in emitted tokens so that a decoded `&`, `=` or `%`
/// cannot be read back as structure.
const TOKEN: &AsciiSet = &CONTROLS.add(b'%').add(b'&').add(b'=');

/// Reasons a raw query string is rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParseError {
    /// `%` not followed by two hex digits.
    #[error("invalid percent escape at byte {0}")]
    InvalidEscape(usize),
    /// `;` used inside a pair.
    #[error("invalid semicolon separator in query")]
    Semicolon,
    /// Percent-decoded bytes are not UTF-8.
    #[error("query component does not decode to UTF-8")]
    InvalidUtf8,
}

/// Result of canonicalizing a query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalQuery {
    /// Double-sorted `key=value` pairs joined by `&`.
    Canonical(String),
    /// The raw input, kept verbatim because it could not be parsed.
    Fallback(String),
}

impl CanonicalQuery {
    /// Returns the textual form used as hash input.
    pub fn as_str(&self) -> &str {
        match self {
            CanonicalQuery::Canonical(value) | CanonicalQuery::Fallback(value) => value,
        }
    }

    /// `true` if there is nothing to hash.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    /// `true` if the permutation invariant holds for this value.
    pub fn is_canonical(&self) -> bool {
        matches!(self, CanonicalQuery::Canonical(_))
    }
}

impl fmt::Display for CanonicalQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonicalizes a raw, URL-encoded query string.
pub fn canonicalize(raw: &str) -> CanonicalQuery {
    match parse_pairs(raw) {
        Ok(mut pairs) => {
            pairs.sort_unstable();
            let canonical = pairs
                .iter()
                .map(|(key, value)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(key, TOKEN),
                        utf8_percent_encode(value, TOKEN)
                    )
                })
                .collect::<Vec<_>>()
                .join("&");
            CanonicalQuery::Canonical(canonical)
        }
        Err(error) => {
            debug!(query = raw, %error, "malformed query string, keeping it verbatim");
            CanonicalQuery::Fallback(raw.to_owned())
        }
    }
}

/// Splits a raw query into decoded `(key, value)` pairs in input order.
///
/// Empty segments are skipped and a segment without `=` has an empty value.
pub fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>, QueryParseError> {
    raw.split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.contains(';') {
                return Err(QueryParseError::Semicolon);
            }
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(component: &str) -> Result<String, QueryParseError> {
    let bytes = component.as_bytes();
    if let Some((position, _)) = component.match_indices('%').find(|(position, _)| {
        !bytes
            .get(position + 1..position + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    }) {
        return Err(QueryParseError::InvalidEscape(position));
    }

    let plus_decoded: Cow<'_, str> = if component.contains('+') {
        Cow::Owned(component.replace('+', " "))
    } else {
        Cow::Borrowed(component)
    };

    percent_decode(plus_decoded.as_bytes())
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| QueryParseError::InvalidUtf8)
}
