//! Traits and structs for rtcache backend interaction.
//!
//! A backend is any key-value store offering `GET`, `SET` with TTL, `DEL` of
//! one or many keys, and cursor-based `SCAN ... MATCH ... COUNT`. Implement
//! [`Backend`] for the raw byte operations and you get typed JSON access
//! through [`CacheBackend`] for free.
mod backend;
pub mod format;
pub mod glob;
mod label;
pub mod scan;

pub use backend::{Backend, BackendResult, CacheBackend};
pub use format::{FormatError, JsonFormat};
pub use glob::GlobMatcher;
pub use label::BackendLabel;
pub use scan::{ScanPage, scan_keys, scan_keys_from};
use thiserror::Error;

/// Raw byte data type used for serialized cache values.
pub type Raw = bytes::Bytes;

/// Proxy Error describes general groups of errors in backend interaction process.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Internal backend error, state or computation error.
    ///
    /// Any error not bounded with network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    /// Network interaction error.
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send + Sync>),
    /// Serializing\Deserializing data error.
    #[error(transparent)]
    FormatError(#[from] FormatError),
}

/// Status of deleting result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Records successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}

impl DeleteStatus {
    /// Number of records removed.
    pub fn count(&self) -> u64 {
        match self {
            DeleteStatus::Deleted(count) => u64::from(*count),
            DeleteStatus::Missing => 0,
        }
    }

    /// Builds a status from a store's delete count.
    pub fn from_count(count: u64) -> Self {
        match count {
            0 => DeleteStatus::Missing,
            n => DeleteStatus::Deleted(u32::try_from(n).unwrap_or(u32::MAX)),
        }
    }
}
