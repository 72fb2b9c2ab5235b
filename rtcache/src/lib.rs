#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Backend-related re-exports.
///
/// This module provides access to the [`Backend`](rtcache_backend::Backend)
/// trait and related types for implementing custom stores.
pub mod backend;

/// The cache handle and its policy.
pub mod cache;

/// Error types for cache operations.
pub mod error;

/// Invalidation after mutations.
pub mod invalidate;

/// Read-through lookups.
pub mod lookup;

/// Metrics collection for cache observability.
///
/// Compiled to no-ops without the `metrics` feature.
pub mod metrics;

mod responder;

pub use cache::{Cache, CacheBuilder, CachePolicy};
pub use error::CacheError;
pub use invalidate::MutationOutcome;
pub use lookup::{Lookup, LookupOutcome};
pub use rtcache_core::{
    ApiResponse, CacheKey, CachePath, CanonicalQuery, InvalidationTarget, KeyPattern, canonicalize,
};
