//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Per-row problems (validation failures, individual storage failures,
/// duplicate skips) are accumulated into `ImportResult` rather than raised;
/// only fatal conditions surface as `Error`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed file: {0}")]
    MalformedFile(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Import aborted after {count} consecutive storage failures: {last}")]
    StorageAborted { count: u32, last: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed-file error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedFile(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("missing header line");
        assert_eq!(err.to_string(), "Malformed file: missing header line");

        let err = Error::StorageAborted {
            count: 5,
            last: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("5 consecutive"));
        assert!(err.to_string().contains("connection refused"));
    }
}
