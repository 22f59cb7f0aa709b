//! TaskBuddy task tracker core
//!
//! The task/user/notification core behind chat-bot task trackers. This
//! library provides identity resolution across messaging platforms, task
//! CRUD with lifecycle notifications fanned out over linked channels, and
//! best-effort mirroring to an external record store. Command front-ends
//! (Discord, Telegram) are external collaborators built on top of it.

#![allow(non_snake_case)]

pub mod config;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{TaskBuddyError, MirrorError, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::{ServiceFactory, IdentityService, TaskService, NotificationDispatcher, ChannelSender};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
