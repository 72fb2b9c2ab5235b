pub use rtcache_backend::{
    Backend, BackendError, BackendLabel, BackendResult, CacheBackend, DeleteStatus, FormatError,
    GlobMatcher, JsonFormat, Raw, ScanPage, scan_keys, scan_keys_from,
};
