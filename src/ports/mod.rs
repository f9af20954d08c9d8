// Ports - Interface definitions (contracts)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::domain::errors::*;

/// Lifecycle callbacks an engine fires for one submitted command.
///
/// `on_failure` and `on_success` are mutually exclusive and fire at most
/// once; `on_finish` follows whichever of the two fired.
pub trait EngineCallbacks: Send + Sync {
    /// Called when the engine begins executing
    fn on_start(&self);

    /// Called with opaque progress text from the engine
    fn on_progress(&self, message: &str);

    /// Called when execution fails, with the engine's diagnostic
    fn on_failure(&self, message: &str);

    /// Called when execution succeeds
    fn on_success(&self, message: &str);

    /// Tail notification after success or failure
    fn on_finish(&self);
}

/// Port for the external transcoding engine
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Submit an argument vector for asynchronous execution.
    ///
    /// Returns once the engine accepted the work; completion is reported
    /// only through `callbacks`. An error here means no callback will fire.
    /// Cancelling `cancel` asks the engine to abort.
    async fn submit(
        &self,
        args: &[String],
        callbacks: Arc<dyn EngineCallbacks>,
        cancel: CancellationToken,
    ) -> Result<(), DomainError>;

    /// Human-readable engine name for logs
    fn name(&self) -> &str;
}

/// Port for temp output allocation
#[async_trait]
pub trait TempFilePort: Send + Sync {
    /// Reserve a fresh, collision-free output path with the given extension.
    /// Nothing exists at the returned path.
    async fn allocate(&self, extension: &str) -> Result<PathBuf, DomainError>;

    /// Remove a file if it exists
    async fn discard(&self, path: &Path) -> Result<(), DomainError>;

    /// Move a finished output to its final destination
    async fn persist(&self, from: &Path, to: &Path) -> Result<(), DomainError>;
}

/// Port for logging and observability
#[async_trait]
pub trait LogPort: Send + Sync {
    /// Log info message
    async fn info(&self, message: &str);

    /// Log warning message
    async fn warn(&self, message: &str);

    /// Log error message
    async fn error(&self, message: &str);

    /// Log debug message
    async fn debug(&self, message: &str);

    /// Log structured event
    async fn log_event(&self, event: &LogEvent);
}

/// Log event with structured data
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            context: HashMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::ConfigError(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
