//! Database service layer
//!
//! Aggregates the per-table repositories behind one handle that services
//! share; all repositories borrow the same pool.

use crate::database::{DatabasePool, UserRepository, TaskRepository, NotificationRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub tasks: TaskRepository,
    pub notifications: NotificationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tasks: TaskRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool),
        }
    }
}
