//! Error handling module for MergeX

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for MergeX operations
#[derive(Error, Debug)]
pub enum MergeXError {
    /// A merge or configuration step failed in the domain layer
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Request file could not be decoded
    #[error("Invalid request file {path}: {message}")]
    RequestFile { path: String, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MergeXError {
    /// Bridge error code for this failure
    pub fn error_code(&self) -> &'static str {
        match self {
            MergeXError::Domain(e) => e.error_code(),
            MergeXError::RequestFile { .. } => "E_INVALID_REQUEST",
            MergeXError::IoError(_) => "E_INTERNAL",
        }
    }
}

/// Result type alias for MergeX operations
pub type MergeXResult<T> = std::result::Result<T, MergeXError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_code() {
        let err: MergeXError = DomainError::TimedOut("no outcome after 5s".into()).into();
        assert_eq!(err.error_code(), "E_TIMEOUT");
        assert!(err.to_string().contains("no outcome after 5s"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: MergeXError = io.into();
        assert_eq!(err.error_code(), "E_INTERNAL");
        assert!(err.to_string().starts_with("I/O error"));
    }
}
