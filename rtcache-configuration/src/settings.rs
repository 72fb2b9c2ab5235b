use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rtcache::cache::{DEFAULT_SCAN_COUNT, DEFAULT_TTL};
use rtcache::{Cache, CachePolicy};
use rtcache_backend::Backend as BackendTrait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::BackendSettings;
use crate::error::ConfigError;

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

fn default_scan_count() -> usize {
    DEFAULT_SCAN_COUNT
}

/// Top-level cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Lifetime of every cached response, e.g. `5m` or `30s`.
    #[serde(default = "default_ttl", with = "humantime_serde")]
    pub ttl: Duration,
    /// Keys examined per wildcard invalidation scan step.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
    pub backend: BackendSettings,
}

impl CacheSettings {
    /// Parses and validates YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: CacheSettings =
            serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reads, parses and validates a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading cache configuration");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl.is_zero() {
            return Err(ConfigError::Invalid("ttl must be positive".to_owned()));
        }
        if self.scan_count == 0 {
            return Err(ConfigError::Invalid("scan_count must be positive".to_owned()));
        }
        self.backend.validate()
    }

    pub fn policy(&self) -> CachePolicy {
        CachePolicy {
            ttl: self.ttl,
            scan_count: self.scan_count,
        }
    }

    /// Builds the backend and wraps it in a cache handle.
    pub fn into_cache(self) -> Result<Cache<Arc<dyn BackendTrait + Send + 'static>>, ConfigError> {
        self.validate()?;
        let policy = self.policy();
        let backend = self.backend.into_backend()?;
        Ok(Cache::new(backend, policy))
    }
}
