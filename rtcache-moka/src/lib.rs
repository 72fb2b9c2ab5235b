//! In-process backend for rtcache built on [moka].
//!
//! Useful for single-node deployments and local development: entries are
//! not shared between processes, so invalidation only reaches the process
//! that performs it.
#![warn(missing_docs)]

mod backend;
mod builder;

pub use backend::MokaBackend;
pub use builder::MokaBackendBuilder;
