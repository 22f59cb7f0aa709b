//! External record-mirror service
//!
//! Replicates users and tasks to an Airtable-style REST store after each
//! core mutation. Replication is best-effort: callers run it on a detached
//! task, log failures, and never retry from here — retry belongs to the
//! mirror's own sync layer.

use std::time::Duration;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::MirrorConfig;
use crate::models::task::Task;
use crate::models::user::User;
use crate::utils::errors::{MirrorError, MirrorResult, Result, TaskBuddyError};

#[derive(Debug, Deserialize)]
struct RecordList {
    records: Vec<RecordRef>,
}

#[derive(Debug, Deserialize)]
struct RecordRef {
    id: String,
}

#[derive(Debug, Clone)]
pub struct MirrorService {
    client: Client,
    config: MirrorConfig,
}

impl MirrorService {
    pub fn new(config: MirrorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("TaskBuddy-Bot/1.0")
            .build()
            .map_err(TaskBuddyError::Http)?;

        Ok(Self { client, config })
    }

    /// Upsert a user row keyed by `user_id`
    pub async fn sync_user(&self, user: &User) -> MirrorResult<()> {
        let fields = json!({
            "user_id": user.id,
            "username": user.username,
            "discord_id": user.discord_id.clone().unwrap_or_default(),
            "telegram_id": user.telegram_id.clone().unwrap_or_default(),
            "role": user.role.as_str(),
            "created_at": user.created_at.to_rfc3339(),
        });

        self.upsert(&self.config.users_table, "user_id", user.id, fields).await
    }

    /// Upsert a task row keyed by `task_id`, with denormalized usernames
    pub async fn sync_task(&self, task: &Task) -> MirrorResult<()> {
        let fields = json!({
            "task_id": task.id,
            "title": task.title,
            "description": task.description.clone().unwrap_or_default(),
            "status": task.status.as_str(),
            "priority": task.priority.as_str(),
            "assignee_username": task.assignee.as_ref().map(|u| u.username.clone()).unwrap_or_default(),
            "creator_username": task.creator.as_ref().map(|u| u.username.clone()).unwrap_or_default(),
            "deadline": task.deadline.map(|d| d.to_rfc3339()).unwrap_or_default(),
            "created_at": task.created_at.to_rfc3339(),
            "updated_at": task.updated_at.to_rfc3339(),
        });

        self.upsert(&self.config.tasks_table, "task_id", task.id, fields).await
    }

    /// Look the record up by its stable key, then update or create it.
    async fn upsert(&self, table: &str, key_field: &str, key: i64, fields: Value) -> MirrorResult<()> {
        let table_url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), table);

        let response = self
            .client
            .get(&table_url)
            .bearer_auth(&self.config.api_key)
            .query(&[
                ("filterByFormula", format!("{{{}}} = {}", key_field, key)),
                ("maxRecords", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| MirrorError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MirrorError::RequestFailed(format!(
                "lookup returned {}",
                response.status()
            )));
        }

        let existing: RecordList = response
            .json()
            .await
            .map_err(|e| MirrorError::InvalidResponse(e.to_string()))?;

        let response = match existing.records.first() {
            Some(record) => {
                debug!(table = table, key = key, "Updating mirrored record");
                self.client
                    .patch(format!("{}/{}", table_url, record.id))
                    .bearer_auth(&self.config.api_key)
                    .json(&json!({ "fields": fields }))
                    .send()
                    .await
            }
            None => {
                debug!(table = table, key = key, "Creating mirrored record");
                self.client
                    .post(&table_url)
                    .bearer_auth(&self.config.api_key)
                    .json(&json!({ "records": [{ "fields": fields }] }))
                    .send()
                    .await
            }
        }
        .map_err(|e| MirrorError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MirrorError::RequestFailed(format!(
                "write returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
