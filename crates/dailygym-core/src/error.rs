//! Error types for Daily English Gym

use std::path::PathBuf;

/// Daily English Gym error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bad input shape or value. Surfaced to the caller as a client error.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A resolved path escaped the log root. Fatal, never retried.
    #[error("Access denied: path outside logs directory: {0}")]
    PathSecurity(PathBuf),

    /// An expected file is absent. Distinguished from generic I/O failure.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Any other filesystem failure, carrying the path and the cause.
    #[error("Storage error at {path}: {source}")]
    StorageIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for Daily English Gym
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn validation<S: Into<String>>(field: &'static str, message: S) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn storage_io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::StorageIo {
            path: path.into(),
            source,
        }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Field name for validation errors, used in API error bodies.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Error::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = Error::validation("date", "Invalid date format (expected YYYY-MM-DD)");
        assert_eq!(err.to_string(), "Invalid date format (expected YYYY-MM-DD)");
        assert_eq!(err.field(), Some("date"));
    }

    #[test]
    fn test_path_security_display() {
        let err = Error::PathSecurity(PathBuf::from("/etc/passwd"));
        assert!(err.to_string().contains("outside logs directory"));
        assert!(err.field().is_none());
    }

    #[test]
    fn test_storage_io_keeps_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::storage_io("/logs/2026-01/2026-01-05.md", io_err);
        assert!(matches!(err, Error::StorageIo { .. }));
        assert!(err.to_string().contains("2026-01-05.md"));
    }
}
