//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub notifications: NotificationsConfig,
    pub mirror: Option<MirrorConfig>,
    pub logging: LoggingConfig,
}

/// Chat bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Telegram bot token; the Telegram channel sender is disabled when absent.
    pub telegram_token: Option<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Identity resolution configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityConfig {
    /// Link a new platform reference onto an existing user whose username
    /// matches the incoming display name. Inherited heuristic: two humans
    /// sharing a display name across platforms would be merged.
    pub merge_by_username: bool,
}

/// Deadline reminder configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationsConfig {
    pub deadline_reminders: bool,
    /// Look-ahead windows in hours, widest first.
    pub reminder_hours: Vec<i64>,
    pub check_interval_minutes: u64,
}

/// External record-mirror configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MirrorConfig {
    pub base_url: String,
    pub api_key: String,
    pub users_table: String,
    pub tasks_table: String,
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("TASKBUDDY"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::TaskBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                telegram_token: None,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/taskbuddy".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            identity: IdentityConfig {
                merge_by_username: true,
            },
            notifications: NotificationsConfig {
                deadline_reminders: true,
                reminder_hours: vec![24, 2],
                check_interval_minutes: 30,
            },
            mirror: None,
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/taskbuddy".to_string(),
            },
        }
    }
}
