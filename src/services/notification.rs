//! Notification dispatcher implementation
//!
//! Persists one notification row per recipient, then attempts delivery over
//! every channel the recipient has linked. The row is the durable artifact;
//! delivery is best-effort and never affects the persisted record or the
//! calling mutation.

use std::sync::Arc;
use futures::future::join_all;
use tracing::{info, debug};

use crate::database::DatabaseService;
use crate::models::notification::{CreateNotificationRequest, Notification, NotificationType};
use crate::models::task::{Task, TaskStatus};
use crate::models::user::{Platform, User};
use crate::services::channels::ChannelSender;
use crate::utils::errors::Result;
use crate::utils::logging;

/// Message texts for each lifecycle event.
pub mod messages {
    use crate::models::task::{Task, TaskStatus};

    pub fn task_created(task: &Task) -> String {
        format!("🆕 New task created: \"{}\"", task.title)
    }

    pub fn task_assigned(task: &Task) -> String {
        format!("📋 You have been assigned a task: \"{}\"", task.title)
    }

    pub fn status_changed(task: &Task, new_status: TaskStatus) -> String {
        format!(
            "{} Task \"{}\" status changed to: {}",
            new_status.emoji(),
            task.title,
            new_status.as_str()
        )
    }

    pub fn deadline_reminder(task: &Task, hours_left: i64) -> String {
        format!(
            "⏰ Reminder: task \"{}\" is due in {} h",
            task.title, hours_left
        )
    }
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    db: DatabaseService,
    senders: Vec<Arc<dyn ChannelSender>>,
}

impl NotificationDispatcher {
    pub fn new(db: DatabaseService, senders: Vec<Arc<dyn ChannelSender>>) -> Self {
        Self { db, senders }
    }

    /// Notify every admin and manager except the task's creator.
    pub async fn notify_task_created(&self, task: &Task) -> Result<()> {
        let message = messages::task_created(task);

        let recipients: Vec<User> = self
            .db
            .users
            .list_admins_and_managers()
            .await?
            .into_iter()
            .filter(|u| task.created_by != Some(u.id))
            .collect();

        info!(task_id = task.id, recipients = recipients.len(), "Dispatching task_created");

        let mut deliveries = Vec::new();
        for recipient in &recipients {
            self.persist(recipient.id, &message, NotificationType::TaskCreated).await?;
            deliveries.push(self.deliver_to_user(recipient, &message));
        }
        join_all(deliveries).await;

        Ok(())
    }

    /// Notify the new assignee.
    pub async fn notify_task_assigned(&self, task: &Task, assignee: &User) -> Result<()> {
        let message = messages::task_assigned(task);

        info!(task_id = task.id, assignee_id = assignee.id, "Dispatching task_assigned");

        self.persist(assignee.id, &message, NotificationType::TaskAssigned).await?;
        self.deliver_to_user(assignee, &message).await;

        Ok(())
    }

    /// Notify the task's creator. Skipped when the creator reference is gone.
    pub async fn notify_status_changed(&self, task: &Task, new_status: TaskStatus) -> Result<()> {
        let Some(creator_id) = task.created_by else {
            debug!(task_id = task.id, "Status changed on task without creator, nothing to notify");
            return Ok(());
        };

        let message = messages::status_changed(task, new_status);

        info!(task_id = task.id, creator_id = creator_id, status = new_status.as_str(), "Dispatching status_changed");

        self.persist(creator_id, &message, NotificationType::StatusChanged).await?;

        let creator = match &task.creator {
            Some(user) => Some(user.clone()),
            None => self.db.users.find_by_id(creator_id).await?,
        };
        if let Some(creator) = creator {
            self.deliver_to_user(&creator, &message).await;
        }

        Ok(())
    }

    /// Remind the assignee about an approaching deadline.
    pub async fn notify_deadline_reminder(&self, task: &Task, assignee: &User, hours_left: i64) -> Result<()> {
        let message = messages::deadline_reminder(task, hours_left);

        info!(task_id = task.id, assignee_id = assignee.id, hours_left = hours_left, "Dispatching deadline_reminder");

        self.persist(assignee.id, &message, NotificationType::DeadlineReminder).await?;
        self.deliver_to_user(assignee, &message).await;

        Ok(())
    }

    /// Attempt delivery over every linked channel, concurrently. Attempts
    /// settle independently; a failed channel is logged and isolated.
    pub async fn deliver_to_user(&self, user: &User, text: &str) {
        let mut attempts = Vec::new();

        for (platform, account_id) in user.linked_channels() {
            let Some(sender) = self.sender_for(platform) else {
                debug!(user_id = user.id, platform = %platform, "No sender configured, skipping channel");
                continue;
            };

            attempts.push(async move {
                match sender.send_direct_message(account_id, text).await {
                    Ok(()) => {
                        debug!(user_id = user.id, platform = %platform, "Direct message delivered");
                    }
                    Err(e) => {
                        logging::log_delivery_failure(user.id, platform.as_str(), &e.to_string());
                    }
                }
            });
        }

        join_all(attempts).await;
    }

    /// Unread notifications for a user, newest first.
    pub async fn unread_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        self.db.notifications.list_unread(user_id).await
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, notification_id: i64) -> Result<bool> {
        self.db.notifications.mark_as_read(notification_id).await
    }

    async fn persist(&self, user_id: i64, message: &str, kind: NotificationType) -> Result<Notification> {
        let notification = self
            .db
            .notifications
            .create(CreateNotificationRequest {
                user_id,
                message: message.to_string(),
                kind,
            })
            .await?;

        debug!(notification_id = notification.id, user_id = user_id, kind = kind.as_str(), "Notification persisted");
        Ok(notification)
    }

    fn sender_for(&self, platform: Platform) -> Option<&Arc<dyn ChannelSender>> {
        self.senders.iter().find(|s| s.platform() == platform)
    }
}
