//! Deployment configuration for rtcache.
//!
//! ```yaml
//! ttl: 5m
//! scan_count: 100
//! backend:
//!   type: Redis
//!   connection_string: "redis://127.0.0.1:6379/0"
//! ```
//!
//! Backends are compiled in through the `redis` and `moka` features.
//! Selecting a backend whose feature is off fails with
//! [`ConfigError::BackendNotAvailable`].

pub mod backend;
pub mod error;
pub mod settings;

pub use backend::{BackendSettings, Moka, Redis};
pub use error::ConfigError;
pub use settings::CacheSettings;
