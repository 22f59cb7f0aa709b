//! User repository implementation

use sqlx::PgPool;
use crate::models::user::{User, CreateUserRequest, Platform, UserRole};
use crate::utils::errors::TaskBuddyError;

const USER_COLUMNS: &str = "id, username, discord_id, telegram_id, role, created_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<User, TaskBuddyError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, discord_id, telegram_id, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, discord_id, telegram_id, role, created_at
            "#
        )
        .bind(request.username)
        .bind(request.discord_id)
        .bind(request.telegram_id)
        .bind(request.role.unwrap_or(UserRole::Member))
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, TaskBuddyError> {
        let user = sqlx::query_as::<_, User>(
            &format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS)
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, TaskBuddyError> {
        let user = sqlx::query_as::<_, User>(
            &format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS)
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by a platform account reference
    pub async fn find_by_platform_ref(&self, platform: Platform, account_id: &str) -> Result<Option<User>, TaskBuddyError> {
        let query = match platform {
            Platform::Discord => format!("SELECT {} FROM users WHERE discord_id = $1", USER_COLUMNS),
            Platform::Telegram => format!("SELECT {} FROM users WHERE telegram_id = $1", USER_COLUMNS),
        };

        let user = sqlx::query_as::<_, User>(&query)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Attach a platform account reference to an existing user
    pub async fn link_platform(&self, id: i64, platform: Platform, account_id: &str) -> Result<Option<User>, TaskBuddyError> {
        let query = match platform {
            Platform::Discord => format!(
                "UPDATE users SET discord_id = $2 WHERE id = $1 RETURNING {}",
                USER_COLUMNS
            ),
            Platform::Telegram => format!(
                "UPDATE users SET telegram_id = $2 WHERE id = $1 RETURNING {}",
                USER_COLUMNS
            ),
        };

        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Update a user's role
    pub async fn update_role(&self, id: i64, role: UserRole) -> Result<Option<User>, TaskBuddyError> {
        let user = sqlx::query_as::<_, User>(
            &format!("UPDATE users SET role = $2 WHERE id = $1 RETURNING {}", USER_COLUMNS)
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all users, oldest first
    pub async fn list_all(&self) -> Result<Vec<User>, TaskBuddyError> {
        let users = sqlx::query_as::<_, User>(
            &format!("SELECT {} FROM users ORDER BY created_at ASC", USER_COLUMNS)
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// List users that should hear about new tasks
    pub async fn list_admins_and_managers(&self) -> Result<Vec<User>, TaskBuddyError> {
        let users = sqlx::query_as::<_, User>(
            &format!(
                "SELECT {} FROM users WHERE role IN ('admin', 'manager') ORDER BY created_at ASC",
                USER_COLUMNS
            )
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Delete user. Tasks and notifications referencing the user survive
    /// with null references.
    pub async fn delete(&self, id: i64) -> Result<bool, TaskBuddyError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
