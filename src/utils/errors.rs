//! Error handling for TaskBuddy
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for TaskBuddy application
#[derive(Error, Debug)]
pub enum TaskBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Mirror sync error: {0}")]
    Mirror(#[from] MirrorError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: i64 },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Record-mirror specific errors
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Mirror request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid mirror response: {0}")]
    InvalidResponse(String),

    #[error("Mirror is not configured")]
    NotConfigured,
}

/// Result type alias for TaskBuddy operations
pub type Result<T> = std::result::Result<T, TaskBuddyError>;

/// Result type alias for mirror operations
pub type MirrorResult<T> = std::result::Result<T, MirrorError>;

impl TaskBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            TaskBuddyError::Database(_) => false,
            TaskBuddyError::Migration(_) => false,
            TaskBuddyError::Telegram(_) => true,
            TaskBuddyError::Mirror(_) => true,
            TaskBuddyError::Config(_) => false,
            TaskBuddyError::PermissionDenied(_) => false,
            TaskBuddyError::UserNotFound { .. } => false,
            TaskBuddyError::TaskNotFound { .. } => false,
            TaskBuddyError::Http(_) => true,
            TaskBuddyError::Serialization(_) => false,
            TaskBuddyError::Io(_) => true,
            TaskBuddyError::UrlParse(_) => false,
            TaskBuddyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TaskBuddyError::Database(_) => ErrorSeverity::Critical,
            TaskBuddyError::Migration(_) => ErrorSeverity::Critical,
            TaskBuddyError::Config(_) => ErrorSeverity::Critical,
            TaskBuddyError::PermissionDenied(_) => ErrorSeverity::Warning,
            TaskBuddyError::Mirror(_) => ErrorSeverity::Warning,
            TaskBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_recoverable() {
        assert!(!TaskBuddyError::TaskNotFound { task_id: 7 }.is_recoverable());
        assert!(!TaskBuddyError::UserNotFound { user_id: 7 }.is_recoverable());
    }

    #[test]
    fn test_mirror_errors_degrade_softly() {
        let err = TaskBuddyError::Mirror(MirrorError::RequestFailed("503".to_string()));
        assert!(err.is_recoverable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }
}
