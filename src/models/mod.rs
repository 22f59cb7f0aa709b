//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod task;
pub mod notification;

// Re-export commonly used models
pub use user::{User, CreateUserRequest, Platform, UserRole};
pub use task::{Task, CreateTaskRequest, UpdateTaskRequest, TaskFilter, TaskStatus, TaskPriority};
pub use notification::{Notification, CreateNotificationRequest, NotificationType};
