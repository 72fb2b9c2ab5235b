use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rtcache_backend::{
    Backend, BackendError, BackendLabel, BackendResult, DeleteStatus, Raw, ScanPage,
};
use rtcache_core::{CacheKey, KeyPattern};

use crate::mock_backend::MockBackend;

/// Backend operation that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Remove,
    Scan,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Remove => "remove",
            Operation::Scan => "scan",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct Failures {
    read: AtomicBool,
    write: AtomicBool,
    remove: AtomicBool,
    scan: AtomicBool,
    scan_steps_left: AtomicUsize,
}

impl Default for Failures {
    fn default() -> Self {
        Self {
            read: AtomicBool::new(false),
            write: AtomicBool::new(false),
            remove: AtomicBool::new(false),
            scan: AtomicBool::new(false),
            scan_steps_left: AtomicUsize::new(usize::MAX),
        }
    }
}

impl Failures {
    fn flag(&self, operation: Operation) -> &AtomicBool {
        match operation {
            Operation::Read => &self.read,
            Operation::Write => &self.write,
            Operation::Remove => &self.remove,
            Operation::Scan => &self.scan,
        }
    }
}

/// Wraps a [`MockBackend`] and fails selected operations with a
/// connection error.
///
/// Nothing fails until told to. Failures can be switched on and off while
/// the backend is in use; clones share the switches.
#[derive(Debug, Clone, Default)]
pub struct FailingBackend {
    inner: MockBackend,
    failures: Arc<Failures>,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wrap(inner: MockBackend) -> Self {
        Self {
            inner,
            failures: Arc::default(),
        }
    }

    /// Backend with every operation failing.
    pub fn unavailable() -> Self {
        let backend = Self::new();
        for operation in [
            Operation::Read,
            Operation::Write,
            Operation::Remove,
            Operation::Scan,
        ] {
            backend.fail(operation);
        }
        backend
    }

    pub fn fail(&self, operation: Operation) {
        self.failures.flag(operation).store(true, Ordering::SeqCst);
    }

    pub fn recover(&self, operation: Operation) {
        self.failures.flag(operation).store(false, Ordering::SeqCst);
    }

    /// Lets `steps` scan steps succeed, then fails every following one.
    pub fn fail_scan_after(&self, steps: usize) {
        self.failures.scan_steps_left.store(steps, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MockBackend {
        &self.inner
    }

    fn check(&self, operation: Operation) -> BackendResult<()> {
        if self.failures.flag(operation).load(Ordering::SeqCst) {
            return Err(forced(operation));
        }
        Ok(())
    }

    fn check_scan_step(&self) -> BackendResult<()> {
        self.check(Operation::Scan)?;
        let allowed = self
            .failures
            .scan_steps_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                usize::MAX => Some(usize::MAX),
                left => Some(left - 1),
            })
            .is_ok();
        if allowed {
            Ok(())
        } else {
            Err(forced(Operation::Scan))
        }
    }
}

fn forced(operation: Operation) -> BackendError {
    BackendError::ConnectionError(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        format!("forced {operation} failure"),
    )))
}

#[async_trait]
impl Backend for FailingBackend {
    async fn read(&self, key: &CacheKey) -> BackendResult<Option<Raw>> {
        self.check(Operation::Read)?;
        self.inner.read(key).await
    }

    async fn write(&self, key: &CacheKey, value: Raw, ttl: Option<Duration>) -> BackendResult<()> {
        self.check(Operation::Write)?;
        self.inner.write(key, value, ttl).await
    }

    async fn remove(&self, key: &CacheKey) -> BackendResult<DeleteStatus> {
        self.check(Operation::Remove)?;
        self.inner.remove(key).await
    }

    async fn remove_many(&self, keys: &[String]) -> BackendResult<DeleteStatus> {
        self.check(Operation::Remove)?;
        self.inner.remove_many(keys).await
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &KeyPattern,
        count: usize,
    ) -> BackendResult<ScanPage> {
        self.check_scan_step()?;
        self.inner.scan(cursor, pattern, count).await
    }

    fn label(&self) -> BackendLabel {
        BackendLabel::new_static("failing")
    }
}
