//! Builder for configuring [`MokaBackend`].

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::CacheBuilder;
use rtcache_backend::BackendLabel;

use crate::backend::{Entry, MokaBackend};

/// Expiration policy reading the TTL stored with each entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration;

impl Expiry<String, Entry> for Expiration {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Moka keeps the old expiry by default; a rewrite must restart the TTL.
        value.ttl
    }
}

/// Builder for creating and configuring a [`MokaBackend`].
///
/// Use [`MokaBackend::builder`] to create a new builder instance.
#[derive(Debug, Clone)]
pub struct MokaBackendBuilder {
    max_capacity: u64,
    label: BackendLabel,
}

impl MokaBackendBuilder {
    pub(crate) fn new(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            label: BackendLabel::new_static("moka"),
        }
    }

    /// Set a custom label used in logs and metrics.
    pub fn label(mut self, label: impl Into<BackendLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Builds the backend.
    pub fn build(self) -> MokaBackend {
        let cache = CacheBuilder::new(self.max_capacity)
            .expire_after(Expiration)
            .build();
        MokaBackend {
            cache,
            label: self.label,
        }
    }
}
