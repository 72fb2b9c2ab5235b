use thiserror::Error;

/// Error loading or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The YAML did not match the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    /// A value is out of range or fields contradict each other.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// The backend is not compiled into this build.
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),
}
