//! Notification repository implementation

use sqlx::PgPool;
use crate::models::notification::{Notification, CreateNotificationRequest};
use crate::utils::errors::TaskBuddyError;

const NOTIFICATION_COLUMNS: &str = "id, user_id, message, type, sent_at, is_read";

#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one dispatch record
    pub async fn create(&self, request: CreateNotificationRequest) -> Result<Notification, TaskBuddyError> {
        let notification = sqlx::query_as::<_, Notification>(
            &format!(
                r#"
                INSERT INTO notifications (user_id, message, type)
                VALUES ($1, $2, $3)
                RETURNING {}
                "#,
                NOTIFICATION_COLUMNS
            )
        )
        .bind(request.user_id)
        .bind(&request.message)
        .bind(request.kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Find notification by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Notification>, TaskBuddyError> {
        let notification = sqlx::query_as::<_, Notification>(
            &format!("SELECT {} FROM notifications WHERE id = $1", NOTIFICATION_COLUMNS)
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    /// Unread notifications for a user, newest first
    pub async fn list_unread(&self, user_id: i64) -> Result<Vec<Notification>, TaskBuddyError> {
        let notifications = sqlx::query_as::<_, Notification>(
            &format!(
                "SELECT {} FROM notifications WHERE user_id = $1 AND is_read = FALSE ORDER BY sent_at DESC",
                NOTIFICATION_COLUMNS
            )
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark a notification as read
    pub async fn mark_as_read(&self, id: i64) -> Result<bool, TaskBuddyError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
