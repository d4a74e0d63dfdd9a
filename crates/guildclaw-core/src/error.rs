//! Unified error types for GuildClaw.

use thiserror::Error;

/// Result type alias using GuildclawError.
pub type Result<T> = std::result::Result<T, GuildclawError>;

#[derive(Error, Debug)]
pub enum GuildclawError {
    // Scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Event queue is empty")]
    EmptyQueue,

    #[error("Could not derive events for record {0}: {1}")]
    Derivation(String, String),

    // Record store errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    // Notifier errors
    #[error("Notifier error: {0}")]
    Notify(String),

    #[error("Notifier not configured: {0}")]
    NotifierNotConfigured(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl GuildclawError {
    pub fn scheduler(msg: impl Into<String>) -> Self {
        Self::Scheduler(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn derivation(record_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Derivation(record_id.into(), msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GuildclawError::Store("sheet row vanished".into());
        assert!(err.to_string().contains("sheet row vanished"));
    }

    #[test]
    fn test_error_constructors() {
        let e1 = GuildclawError::scheduler("test");
        assert!(matches!(e1, GuildclawError::Scheduler(_)));

        let e2 = GuildclawError::store("test");
        assert!(matches!(e2, GuildclawError::Store(_)));

        let e3 = GuildclawError::notify("test");
        assert!(matches!(e3, GuildclawError::Notify(_)));

        let e4 = GuildclawError::derivation("rec-1", "bad month");
        assert!(e4.to_string().contains("rec-1"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GuildclawError = io_err.into();
        assert!(matches!(err, GuildclawError::Io(_)));
    }
}
