//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the TaskBuddy application.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "taskbuddy.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log task lifecycle actions with structured data
pub fn log_task_action(task_id: i64, action: &str, user_id: Option<i64>, details: Option<&str>) {
    info!(
        task_id = task_id,
        action = action,
        user_id = user_id,
        details = details,
        "Task action performed"
    );
}

/// Log identity resolution events
pub fn log_identity_event(user_id: i64, platform: &str, event: &str) {
    info!(
        user_id = user_id,
        platform = platform,
        event = event,
        "Identity event"
    );
}

/// Log delivery failures without propagating them
pub fn log_delivery_failure(user_id: i64, platform: &str, error: &str) {
    warn!(
        user_id = user_id,
        platform = platform,
        error = error,
        "Channel delivery failed"
    );
}

/// Log mirror replication outcomes
pub fn log_mirror_result(record: &str, record_id: i64, success: bool, error: Option<&str>) {
    if success {
        info!(record = record, record_id = record_id, "Mirror sync completed");
    } else {
        warn!(
            record = record,
            record_id = record_id,
            error = error,
            "Mirror sync failed"
        );
    }
}
