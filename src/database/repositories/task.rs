//! Task repository implementation
//!
//! Tasks are always read through the same joined SELECT so every caller gets
//! the denormalized assignee/creator snapshots in one round trip.

use chrono::{Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use crate::models::task::{Task, CreateTaskRequest, UpdateTaskRequest, TaskFilter, TaskPriority};
use crate::models::user::User;
use crate::utils::errors::TaskBuddyError;

const TASK_COLUMNS: &str = r#"
    t.id, t.title, t.description, t.status, t.priority, t.assignee_id,
    t.created_by, t.deadline, t.created_at, t.updated_at,
    a.id AS assignee_user_id, a.username AS assignee_username,
    a.discord_id AS assignee_discord_id, a.telegram_id AS assignee_telegram_id,
    a.role AS assignee_role, a.created_at AS assignee_created_at,
    c.id AS creator_user_id, c.username AS creator_username,
    c.discord_id AS creator_discord_id, c.telegram_id AS creator_telegram_id,
    c.role AS creator_role, c.created_at AS creator_created_at"#;

const TASK_JOINS: &str = r#"
    FROM tasks t
    LEFT JOIN users a ON t.assignee_id = a.id
    LEFT JOIN users c ON t.created_by = c.id"#;

#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new task and return the joined record
    pub async fn create(&self, request: CreateTaskRequest) -> Result<Task, TaskBuddyError> {
        let (task_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tasks (title, description, priority, assignee_id, created_by, deadline)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.priority.unwrap_or(TaskPriority::Medium))
        .bind(request.assignee_id)
        .bind(request.created_by)
        .bind(request.deadline)
        .fetch_one(&self.pool)
        .await?;

        let task = self.find_by_id(task_id).await?.ok_or(sqlx::Error::RowNotFound)?;
        Ok(task)
    }

    /// Find task by ID with assignee and creator joined
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Task>, TaskBuddyError> {
        let query = format!("SELECT {} {} WHERE t.id = $1", TASK_COLUMNS, TASK_JOINS);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| map_joined_row(&r)).transpose().map_err(Into::into)
    }

    /// List tasks with optional filters, newest first
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, TaskBuddyError> {
        let mut query = format!("SELECT {} {} WHERE 1=1", TASK_COLUMNS, TASK_JOINS);
        let mut bind_count = 0;

        if filter.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND t.status = ${}", bind_count));
        }
        if filter.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND t.priority = ${}", bind_count));
        }
        match filter.assignee_id {
            Some(Some(_)) => {
                bind_count += 1;
                query.push_str(&format!(" AND t.assignee_id = ${}", bind_count));
            }
            Some(None) => query.push_str(" AND t.assignee_id IS NULL"),
            None => {}
        }
        if filter.created_by.is_some() {
            bind_count += 1;
            query.push_str(&format!(" AND t.created_by = ${}", bind_count));
        }

        query.push_str(" ORDER BY t.created_at DESC, t.id DESC");

        let mut q = sqlx::query(&query);
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(Some(assignee_id)) = filter.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(created_by) = filter.created_by {
            q = q.bind(created_by);
        }

        let rows = q.fetch_all(&self.pool).await?;
        rows.iter()
            .map(map_joined_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Apply a partial update. Absent fields are untouched; an empty partial
    /// returns the current record without refreshing updated_at.
    pub async fn update(&self, id: i64, request: &UpdateTaskRequest) -> Result<Option<Task>, TaskBuddyError> {
        if request.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut sets = Vec::new();
        let mut bind_count = 1; // $1 is the task id

        if request.title.is_some() {
            bind_count += 1;
            sets.push(format!("title = ${}", bind_count));
        }
        if request.description.is_some() {
            bind_count += 1;
            sets.push(format!("description = ${}", bind_count));
        }
        if request.status.is_some() {
            bind_count += 1;
            sets.push(format!("status = ${}", bind_count));
        }
        if request.priority.is_some() {
            bind_count += 1;
            sets.push(format!("priority = ${}", bind_count));
        }
        if request.assignee_id.is_some() {
            bind_count += 1;
            sets.push(format!("assignee_id = ${}", bind_count));
        }
        if request.deadline.is_some() {
            bind_count += 1;
            sets.push(format!("deadline = ${}", bind_count));
        }

        bind_count += 1;
        sets.push(format!("updated_at = ${}", bind_count));

        let query = format!("UPDATE tasks SET {} WHERE id = $1", sets.join(", "));

        let mut q = sqlx::query(&query).bind(id);
        if let Some(title) = &request.title {
            q = q.bind(title);
        }
        if let Some(description) = &request.description {
            q = q.bind(description.as_deref());
        }
        if let Some(status) = request.status {
            q = q.bind(status);
        }
        if let Some(priority) = request.priority {
            q = q.bind(priority);
        }
        if let Some(assignee_id) = request.assignee_id {
            q = q.bind(assignee_id);
        }
        if let Some(deadline) = request.deadline {
            q = q.bind(deadline);
        }
        q = q.bind(Utc::now());

        let result = q.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    /// Delete task. Notification rows referencing the task's users survive.
    pub async fn delete(&self, id: i64) -> Result<bool, TaskBuddyError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tasks assigned to the given user, newest first
    pub async fn list_for_assignee(&self, user_id: i64) -> Result<Vec<Task>, TaskBuddyError> {
        self.list(&TaskFilter {
            assignee_id: Some(Some(user_id)),
            ..Default::default()
        })
        .await
    }

    /// Unfinished tasks whose deadline falls in the half-open window
    /// (now, now + hours], soonest first
    pub async fn list_with_deadline_within(&self, hours: i64) -> Result<Vec<Task>, TaskBuddyError> {
        let now = Utc::now();
        let until = now + Duration::hours(hours);

        let query = format!(
            r#"SELECT {} {}
            WHERE t.deadline IS NOT NULL
              AND t.status <> 'done'
              AND t.deadline > $1
              AND t.deadline <= $2
            ORDER BY t.deadline ASC"#,
            TASK_COLUMNS, TASK_JOINS
        );

        let rows = sqlx::query(&query)
            .bind(now)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(map_joined_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

/// Build a joined Task out of one result row. The user snapshots come from
/// aliased LEFT JOIN columns and are absent when the reference is null.
fn map_joined_row(row: &PgRow) -> Result<Task, sqlx::Error> {
    let assignee = match row.try_get::<Option<i64>, _>("assignee_user_id")? {
        Some(id) => Some(User {
            id,
            username: row.try_get("assignee_username")?,
            discord_id: row.try_get("assignee_discord_id")?,
            telegram_id: row.try_get("assignee_telegram_id")?,
            role: row.try_get("assignee_role")?,
            created_at: row.try_get("assignee_created_at")?,
        }),
        None => None,
    };

    let creator = match row.try_get::<Option<i64>, _>("creator_user_id")? {
        Some(id) => Some(User {
            id,
            username: row.try_get("creator_username")?,
            discord_id: row.try_get("creator_discord_id")?,
            telegram_id: row.try_get("creator_telegram_id")?,
            role: row.try_get("creator_role")?,
            created_at: row.try_get("creator_created_at")?,
        }),
        None => None,
    };

    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: row.try_get("status")?,
        priority: row.try_get("priority")?,
        assignee_id: row.try_get("assignee_id")?,
        created_by: row.try_get("created_by")?,
        deadline: row.try_get("deadline")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        assignee,
        creator,
    })
}
