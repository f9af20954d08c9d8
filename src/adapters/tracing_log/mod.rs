// Tracing log adapter - Structured logging using tracing crate

use async_trait::async_trait;
use tracing::{debug, error, info, trace, warn};

use crate::ports::*;

/// Tracing log adapter
pub struct TracingLogAdapter {
    min_level: LogLevel,
}

impl TracingLogAdapter {
    /// Create new tracing log adapter; the subscriber is installed by the binary
    pub fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }

    /// Check if log level should be logged
    fn should_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn render_context(event: &LogEvent) -> String {
        let mut pairs: Vec<_> = event.context.iter().collect();
        pairs.sort();
        pairs
            .into_iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TracingLogAdapter {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

#[async_trait]
impl LogPort for TracingLogAdapter {
    async fn info(&self, message: &str) {
        if self.should_log(LogLevel::Info) {
            info!("{}", message);
        }
    }

    async fn warn(&self, message: &str) {
        if self.should_log(LogLevel::Warn) {
            warn!("{}", message);
        }
    }

    async fn error(&self, message: &str) {
        if self.should_log(LogLevel::Error) {
            error!("{}", message);
        }
    }

    async fn debug(&self, message: &str) {
        if self.should_log(LogLevel::Debug) {
            debug!("{}", message);
        }
    }

    async fn log_event(&self, event: &LogEvent) {
        if !self.should_log(event.level) {
            return;
        }

        let context = Self::render_context(event);
        let timestamp = event.timestamp.to_rfc3339();
        match event.level {
            LogLevel::Error => error!(message = %event.message, %context, %timestamp),
            LogLevel::Warn => warn!(message = %event.message, %context, %timestamp),
            LogLevel::Info => info!(message = %event.message, %context, %timestamp),
            LogLevel::Debug => debug!(message = %event.message, %context, %timestamp),
            LogLevel::Trace => trace!(message = %event.message, %context, %timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let adapter = TracingLogAdapter::new(LogLevel::Warn);
        assert!(adapter.should_log(LogLevel::Error));
        assert!(adapter.should_log(LogLevel::Warn));
        assert!(!adapter.should_log(LogLevel::Info));
    }

    #[test]
    fn test_context_is_sorted() {
        let event = LogEvent::new(LogLevel::Info, "x").with("b", 2).with("a", 1);
        assert_eq!(TracingLogAdapter::render_context(&event), "a=1 b=2");
    }
}
