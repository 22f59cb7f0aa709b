//! Services module
//!
//! This module contains business logic services

pub mod channels;
pub mod identity;
pub mod mirror;
pub mod notification;
pub mod reminders;
pub mod task;

// Re-export commonly used services
pub use channels::{ChannelSender, TelegramSender};
pub use identity::IdentityService;
pub use mirror::MirrorService;
pub use notification::NotificationDispatcher;
pub use task::TaskService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub identity_service: IdentityService,
    pub task_service: TaskService,
    pub notification_dispatcher: NotificationDispatcher,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized. Senders
    /// are one per platform; platforms without a sender are skipped at
    /// delivery time.
    pub fn new(
        settings: Settings,
        db: DatabaseService,
        senders: Vec<Arc<dyn ChannelSender>>,
    ) -> Result<Self> {
        let mirror = match &settings.mirror {
            Some(config) => Some(Arc::new(MirrorService::new(config.clone())?)),
            None => None,
        };

        let notification_dispatcher = NotificationDispatcher::new(db.clone(), senders);
        let identity_service = IdentityService::new(db.users.clone(), settings, mirror.clone());
        let task_service = TaskService::new(db, notification_dispatcher.clone(), mirror);

        Ok(Self {
            identity_service,
            task_service,
            notification_dispatcher,
        })
    }
}
