use std::sync::Arc;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use rtcache_backend::Backend as BackendTrait;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_REDIS_HOST: &str = "127.0.0.1";
const DEFAULT_REDIS_PORT: u16 = 6379;
const REDIS_SCHEMES: [&str; 4] = ["redis://", "rediss://", "redis+unix://", "unix://"];

/// In-process moka store.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Moka {
    pub max_capacity: u64,
    /// Optional label for this backend (used in metrics/tracing).
    #[serde(default)]
    pub label: Option<String>,
}

/// Redis-compatible store.
///
/// Either a full `connection_string`, or `host`/`port`/`password`/`db`
/// parts. Both at once is rejected.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db: Option<u32>,
    /// Optional label for this backend (used in metrics/tracing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Redis {
    /// Connection URL for the redis client.
    pub fn url(&self) -> Result<String, ConfigError> {
        let has_parts = self.host.is_some()
            || self.port.is_some()
            || self.password.is_some()
            || self.db.is_some();
        match &self.connection_string {
            Some(_) if has_parts => Err(ConfigError::Invalid(
                "redis: set either connection_string or host/port/password/db".to_owned(),
            )),
            Some(url) if !REDIS_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) => {
                Err(ConfigError::Invalid(format!(
                    "redis: connection_string {url:?} is not a redis URL"
                )))
            }
            Some(url) => Ok(url.clone()),
            None => {
                let host = self.host.as_deref().unwrap_or(DEFAULT_REDIS_HOST);
                let port = self.port.unwrap_or(DEFAULT_REDIS_PORT);
                let auth = match self.password.as_deref() {
                    Some(password) if !password.is_empty() => {
                        format!(":{}@", utf8_percent_encode(password, NON_ALPHANUMERIC))
                    }
                    _ => String::new(),
                };
                let db = self.db.unwrap_or(0);
                Ok(format!("redis://{auth}{host}:{port}/{db}"))
            }
        }
    }

    /// Checks the fields and, when the Redis backend is compiled in, that the
    /// client accepts the URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url()?;
        Self::check_url(&url)
    }

    #[cfg(feature = "redis")]
    fn check_url(url: &str) -> Result<(), ConfigError> {
        rtcache_redis::RedisBackend::builder()
            .server(url)
            .build()
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(format!("redis: {e}")))
    }

    #[cfg(not(feature = "redis"))]
    fn check_url(_url: &str) -> Result<(), ConfigError> {
        Ok(())
    }

    #[cfg(feature = "redis")]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        use rtcache_redis::RedisBackend;

        let mut builder = RedisBackend::builder().server(self.url()?);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        let backend = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("redis: {e}")))?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(feature = "redis"))]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Redis".to_string()))
    }
}

impl Moka {
    #[cfg(feature = "moka")]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        use rtcache_moka::MokaBackend;

        let mut builder = MokaBackend::builder(self.max_capacity);
        if let Some(label) = self.label {
            builder = builder.label(label);
        }
        Ok(Arc::new(builder.build()))
    }

    #[cfg(not(feature = "moka"))]
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        Err(ConfigError::BackendNotAvailable("Moka".to_string()))
    }
}

/// Store selection, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum BackendSettings {
    Moka(Moka),
    Redis(Redis),
}

impl BackendSettings {
    pub fn into_backend(self) -> Result<Arc<dyn BackendTrait + Send + 'static>, ConfigError> {
        match self {
            BackendSettings::Moka(config) => config.into_backend(),
            BackendSettings::Redis(config) => config.into_backend(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            BackendSettings::Moka(config) if config.max_capacity == 0 => Err(
                ConfigError::Invalid("moka: max_capacity must be positive".to_owned()),
            ),
            BackendSettings::Moka(_) => Ok(()),
            BackendSettings::Redis(config) => config.validate(),
        }
    }
}
