// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Request rejected before any I/O (empty inputs, bad options)
    InvalidRequest(String),
    /// The filesystem could not provide a temp output path
    TempAllocationFailure(String),
    /// The engine refused the submission before any callback fired
    EngineInvocationFailure(String),
    /// The engine reported a failure through its callbacks
    EngineExecutionFailure(String),
    /// The caller cancelled an in-flight merge
    Cancelled(String),
    /// The merge did not reach a terminal outcome in time
    TimedOut(String),
    /// Configuration could not be loaded or is invalid
    ConfigError(String),
    /// Internal error
    InternalError(String),
}

impl DomainError {
    /// Stable code handed to the caller's result sink
    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::InvalidRequest(_) => "E_INVALID_REQUEST",
            DomainError::TempAllocationFailure(_) => "E_TEMP_ALLOCATION",
            DomainError::EngineInvocationFailure(_) => "E_ENGINE_INVOCATION",
            DomainError::EngineExecutionFailure(_) => "E_ENGINE_EXECUTION",
            DomainError::Cancelled(_) => "E_CANCELLED",
            DomainError::TimedOut(_) => "E_TIMEOUT",
            DomainError::ConfigError(_) => "E_CONFIG",
            DomainError::InternalError(_) => "E_INTERNAL",
        }
    }

    /// Message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            DomainError::InvalidRequest(msg)
            | DomainError::TempAllocationFailure(msg)
            | DomainError::EngineInvocationFailure(msg)
            | DomainError::EngineExecutionFailure(msg)
            | DomainError::Cancelled(msg)
            | DomainError::TimedOut(msg)
            | DomainError::ConfigError(msg)
            | DomainError::InternalError(msg) => msg,
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            DomainError::TempAllocationFailure(msg) => {
                write!(f, "Temp output allocation failed: {}", msg)
            }
            DomainError::EngineInvocationFailure(msg) => {
                write!(f, "Engine invocation failed: {}", msg)
            }
            DomainError::EngineExecutionFailure(msg) => {
                write!(f, "Engine execution failed: {}", msg)
            }
            DomainError::Cancelled(msg) => write!(f, "Cancelled: {}", msg),
            DomainError::TimedOut(msg) => write!(f, "Timed out: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            DomainError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
