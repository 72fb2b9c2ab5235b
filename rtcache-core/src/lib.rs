#![warn(missing_docs)]
//! # rtcache-core
//!
//! Pure building blocks of the rtcache response cache. Nothing in this crate
//! performs I/O.
//!
//! - [`query`] turns a raw query string into an order-independent
//!   [`CanonicalQuery`].
//! - [`key`] combines a namespace, a route path and the canonical query into
//!   a [`CacheKey`] of the form `{namespace}:{path}:query={digest}`.
//! - [`pattern`] builds the SCAN pattern matching every query variant of a path.
//! - [`target`] describes what a write endpoint wants removed.
//! - [`envelope`] is the status/message/data body that gets cached.
//!
//! ```
//! use rtcache_core::CacheKey;
//!
//! let a = CacheKey::build("items", "/items", "b=2&a=1");
//! let b = CacheKey::build("items", "/items", "a=1&b=2");
//! assert_eq!(a, b);
//!
//! let detail = CacheKey::build("items", "/items/42", "");
//! assert_eq!(detail.as_str(), "items:/items/42:query=none");
//! ```

pub mod envelope;
pub mod key;
pub mod path;
pub mod pattern;
pub mod query;
pub mod target;

pub use envelope::ApiResponse;
pub use key::{CacheKey, QueryDigest};
pub use path::CachePath;
pub use pattern::KeyPattern;
pub use query::{CanonicalQuery, QueryParseError, canonicalize};
#[doc(hidden)]
pub use smol_str::SmolStr;
pub use target::InvalidationTarget;
