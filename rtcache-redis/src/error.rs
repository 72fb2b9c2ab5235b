//! Error types for Redis backend operations.
//!
//! All errors convert into [`BackendError`]. Transport failures become
//! [`BackendError::ConnectionError`], everything the server rejected becomes
//! [`BackendError::InternalError`].
//!
//! [`BackendError`]: rtcache_backend::BackendError
//! [`BackendError::ConnectionError`]: rtcache_backend::BackendError::ConnectionError
//! [`BackendError::InternalError`]: rtcache_backend::BackendError::InternalError

use redis::RedisError;
use rtcache_backend::BackendError;

/// Error type for Redis backend operations.
///
/// You typically don't handle this error directly. It appears when building
/// the backend from an invalid connection URL, or when the lazily opened
/// connection or a command fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    #[error("Redis backend error: {0}")]
    Redis(#[from] RedisError),
}

impl Error {
    /// Whether the error is a network-level failure rather than a server reply.
    pub fn is_connection(&self) -> bool {
        match self {
            Error::Redis(error) => {
                error.is_io_error()
                    || error.is_connection_refusal()
                    || error.is_connection_dropped()
                    || error.is_timeout()
            }
        }
    }
}

impl From<Error> for BackendError {
    fn from(error: Error) -> Self {
        if error.is_connection() {
            Self::ConnectionError(Box::new(error))
        } else {
            Self::InternalError(Box::new(error))
        }
    }
}
