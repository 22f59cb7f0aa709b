//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod task;
pub mod notification;

// Re-export repositories
pub use user::UserRepository;
pub use task::TaskRepository;
pub use notification::NotificationRepository;
