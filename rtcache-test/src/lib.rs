#![doc = include_str!("../README.md")]

pub mod app;
pub mod clock;
pub mod failing_backend;
pub mod mock_backend;

pub use clock::ManualClock;
pub use failing_backend::{FailingBackend, Operation};
pub use mock_backend::{BackendCounters, MockBackend};
