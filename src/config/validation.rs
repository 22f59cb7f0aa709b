//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{TaskBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_notifications_config(&settings.notifications)?;
    validate_logging_config(&settings.logging)?;

    if let Some(ref mirror_config) = settings.mirror {
        validate_mirror_config(mirror_config)?;
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(TaskBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(TaskBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(TaskBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate deadline reminder configuration
fn validate_notifications_config(config: &super::NotificationsConfig) -> Result<()> {
    if config.deadline_reminders {
        if config.reminder_hours.is_empty() {
            return Err(TaskBuddyError::Config(
                "At least one reminder window is required when deadline reminders are enabled".to_string()
            ));
        }

        if config.reminder_hours.iter().any(|&h| h <= 0) {
            return Err(TaskBuddyError::Config(
                "Reminder windows must be positive hour counts".to_string()
            ));
        }

        if config.check_interval_minutes == 0 {
            return Err(TaskBuddyError::Config(
                "Reminder check interval must be greater than 0".to_string()
            ));
        }
    }

    Ok(())
}

/// Validate record-mirror configuration
fn validate_mirror_config(config: &super::MirrorConfig) -> Result<()> {
    url::Url::parse(&config.base_url)?;

    if config.api_key.is_empty() {
        return Err(TaskBuddyError::Config(
            "Mirror API key is required".to_string()
        ));
    }

    if config.users_table.is_empty() || config.tasks_table.is_empty() {
        return Err(TaskBuddyError::Config(
            "Mirror table names are required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(TaskBuddyError::Config(
            "Mirror timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(TaskBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(TaskBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
