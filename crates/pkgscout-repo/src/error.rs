//! Error types for repository operations

use std::time::Duration;
use thiserror::Error;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Construction Errors ============
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Invalid package source: {location}")]
    InvalidSource { location: String },

    // ============ Configuration Errors ============
    #[error("Source not found: {name}")]
    SourceNotFound { name: String },

    #[error("Source already exists: {name}")]
    SourceAlreadyExists { name: String },

    #[error("Invalid sources configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Network Errors ============
    #[error("HTTP error: {status} - {message}")]
    HttpError { status: u16, message: String },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timeout after {seconds}s")]
    Timeout { seconds: u64 },

    // ============ Index Errors ============
    #[error("Index not found at {location}")]
    IndexNotFound { location: String },

    #[error("Index parse error: {message}")]
    IndexParseError { message: String },

    // ============ Package Errors ============
    #[error("Package archive not found: {id}@{version} in {source_location}")]
    ArchiveNotFound {
        id: String,
        version: String,
        source_location: String,
    },

    #[error("Integrity check failed for {id}: expected {expected}, got {actual}")]
    IntegrityCheckFailed {
        id: String,
        expected: String,
        actual: String,
    },

    // ============ Discovery Errors ============
    #[error("No package sources are available")]
    NoSources,

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Core(#[from] pkgscout_core::CoreError),

    // ============ Other ============
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl RepoError {
    /// Map a transport error, reporting timeouts with the configured limit
    pub fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            RepoError::Timeout {
                seconds: timeout.as_secs(),
            }
        } else if e.is_connect() {
            RepoError::NetworkError {
                message: format!("Connection failed: {}", e),
            }
        } else if let Some(status) = e.status() {
            RepoError::HttpError {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            RepoError::NetworkError {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}
