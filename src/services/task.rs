//! Task store service
//!
//! Owns task CRUD and filtered retrieval. Successful mutations trigger
//! notification dispatch and a detached, best-effort mirror sync; neither
//! affects the caller's result.

use std::sync::Arc;
use tracing::{info, debug, error};

use crate::database::DatabaseService;
use crate::models::task::{Task, CreateTaskRequest, UpdateTaskRequest, TaskFilter};
use crate::services::mirror::MirrorService;
use crate::services::notification::NotificationDispatcher;
use crate::utils::errors::{TaskBuddyError, Result};
use crate::utils::logging;

#[derive(Clone)]
pub struct TaskService {
    db: DatabaseService,
    dispatcher: NotificationDispatcher,
    mirror: Option<Arc<MirrorService>>,
}

impl TaskService {
    pub fn new(db: DatabaseService, dispatcher: NotificationDispatcher, mirror: Option<Arc<MirrorService>>) -> Self {
        Self { db, dispatcher, mirror }
    }

    /// Create a task. Title must be non-empty and the creator must exist;
    /// status and priority fall back to their defaults.
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task> {
        if request.title.trim().is_empty() {
            return Err(TaskBuddyError::InvalidInput("Task title is required".to_string()));
        }

        if self.db.users.find_by_id(request.created_by).await?.is_none() {
            return Err(TaskBuddyError::UserNotFound { user_id: request.created_by });
        }

        let task = self.db.tasks.create(request).await?;
        logging::log_task_action(task.id, "created", task.created_by, Some(&task.title));

        if let Err(e) = self.dispatcher.notify_task_created(&task).await {
            error!(task_id = task.id, error = %e, "Failed to dispatch task_created notifications");
        }

        if let Some(assignee) = task.assignee.clone() {
            if let Err(e) = self.dispatcher.notify_task_assigned(&task, &assignee).await {
                error!(task_id = task.id, error = %e, "Failed to dispatch task_assigned notification");
            }
        }

        self.spawn_mirror_sync(&task);
        Ok(task)
    }

    /// Get a task by ID
    pub async fn get(&self, id: i64) -> Result<Option<Task>> {
        debug!(task_id = id, "Fetching task");
        self.db.tasks.find_by_id(id).await
    }

    /// List tasks with optional filters, newest first
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.db.tasks.list(filter).await
    }

    /// Apply a partial update; only supplied fields change. Returns `None`
    /// for an unknown id. An actual status change notifies the creator; an
    /// actual assignee change notifies the new assignee.
    pub async fn update(&self, id: i64, request: UpdateTaskRequest) -> Result<Option<Task>> {
        let Some(before) = self.db.tasks.find_by_id(id).await? else {
            return Ok(None);
        };

        let Some(task) = self.db.tasks.update(id, &request).await? else {
            return Ok(None);
        };

        logging::log_task_action(task.id, "updated", None, None);

        if request.assignee_id.is_some() && task.assignee_id != before.assignee_id {
            if let Some(assignee) = task.assignee.clone() {
                if let Err(e) = self.dispatcher.notify_task_assigned(&task, &assignee).await {
                    error!(task_id = task.id, error = %e, "Failed to dispatch task_assigned notification");
                }
            }
        }

        if request.status.is_some() && task.status != before.status {
            if let Err(e) = self.dispatcher.notify_status_changed(&task, task.status).await {
                error!(task_id = task.id, error = %e, "Failed to dispatch status_changed notification");
            }
        }

        self.spawn_mirror_sync(&task);
        Ok(Some(task))
    }

    /// Delete a task. Notification rows are not cascaded.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.db.tasks.delete(id).await?;

        if deleted {
            info!(task_id = id, "Task deleted");
        }

        Ok(deleted)
    }

    /// Tasks assigned to the given user
    pub async fn list_for_assignee(&self, user_id: i64) -> Result<Vec<Task>> {
        self.db.tasks.list_for_assignee(user_id).await
    }

    /// Unfinished tasks due within the next `hours`, soonest first
    pub async fn list_with_deadline_within(&self, hours: i64) -> Result<Vec<Task>> {
        self.db.tasks.list_with_deadline_within(hours).await
    }

    fn spawn_mirror_sync(&self, task: &Task) {
        if let Some(mirror) = &self.mirror {
            let mirror = Arc::clone(mirror);
            let task = task.clone();
            tokio::spawn(async move {
                match mirror.sync_task(&task).await {
                    Ok(()) => logging::log_mirror_result("task", task.id, true, None),
                    Err(e) => logging::log_mirror_result("task", task.id, false, Some(&e.to_string())),
                }
            });
        }
    }
}
