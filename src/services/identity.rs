//! Identity resolution service
//!
//! Maps per-platform account references onto canonical user records. A user
//! may arrive via any platform first; later platforms attach to the same
//! logical identity by matching display name. That merge is a heuristic
//! (two humans sharing a display name would be silently merged) and can be
//! disabled via `identity.merge_by_username`.

use std::sync::Arc;
use tracing::{info, warn, debug};

use crate::config::settings::Settings;
use crate::database::repositories::UserRepository;
use crate::models::user::{User, CreateUserRequest, Platform, UserRole};
use crate::services::mirror::MirrorService;
use crate::utils::errors::{TaskBuddyError, Result};
use crate::utils::logging;

#[derive(Clone)]
pub struct IdentityService {
    users: UserRepository,
    settings: Settings,
    mirror: Option<Arc<MirrorService>>,
}

impl IdentityService {
    pub fn new(users: UserRepository, settings: Settings, mirror: Option<Arc<MirrorService>>) -> Self {
        Self { users, settings, mirror }
    }

    /// Resolve a platform account to a user, linking or creating as needed.
    /// Resolving the same platform reference twice returns the same user.
    pub async fn resolve_or_create(&self, platform: Platform, account_id: &str, display_name: &str) -> Result<User> {
        debug!(platform = %platform, account_id = account_id, "Resolving user identity");

        if let Some(user) = self.users.find_by_platform_ref(platform, account_id).await? {
            return Ok(user);
        }

        if self.settings.identity.merge_by_username {
            if let Some(existing) = self.users.find_by_username(display_name).await? {
                warn!(
                    user_id = existing.id,
                    platform = %platform,
                    account_id = account_id,
                    username = display_name,
                    "Linking platform reference onto existing user by display name; merge is heuristic"
                );

                let user = self
                    .users
                    .link_platform(existing.id, platform, account_id)
                    .await?
                    .ok_or(TaskBuddyError::UserNotFound { user_id: existing.id })?;

                logging::log_identity_event(user.id, platform.as_str(), "platform_linked");
                self.spawn_mirror_sync(&user);
                return Ok(user);
            }
        }

        let username = if self.settings.identity.merge_by_username {
            display_name.to_string()
        } else if self.users.find_by_username(display_name).await?.is_some() {
            // Merge disabled: keep the colliding name distinct per platform
            format!("{}@{}", display_name, platform)
        } else {
            display_name.to_string()
        };

        let mut request = CreateUserRequest {
            username,
            discord_id: None,
            telegram_id: None,
            role: None,
        };
        match platform {
            Platform::Discord => request.discord_id = Some(account_id.to_string()),
            Platform::Telegram => request.telegram_id = Some(account_id.to_string()),
        }

        let user = self.users.create(request).await?;
        info!(user_id = user.id, platform = %platform, username = %user.username, "New user registered");

        logging::log_identity_event(user.id, platform.as_str(), "user_created");
        self.spawn_mirror_sync(&user);
        Ok(user)
    }

    /// Compare the user's role against the required role on the fixed
    /// ordinal. Unknown user ids fail closed.
    pub async fn has_permission(&self, user_id: i64, required_role: UserRole) -> Result<bool> {
        let Some(user) = self.users.find_by_id(user_id).await? else {
            return Ok(false);
        };

        Ok(user.role.rank() >= required_role.rank())
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    /// Change a user's role
    pub async fn update_role(&self, user_id: i64, role: UserRole) -> Result<Option<User>> {
        let user = self.users.update_role(user_id, role).await?;

        if let Some(ref user) = user {
            info!(user_id = user.id, role = role.as_str(), "User role updated");
            self.spawn_mirror_sync(user);
        }

        Ok(user)
    }

    /// Attach a platform reference to an existing user
    pub async fn link_platform(&self, user_id: i64, platform: Platform, account_id: &str) -> Result<Option<User>> {
        let user = self.users.link_platform(user_id, platform, account_id).await?;

        if let Some(ref user) = user {
            logging::log_identity_event(user.id, platform.as_str(), "platform_linked");
            self.spawn_mirror_sync(user);
        }

        Ok(user)
    }

    /// All team members, oldest first
    pub async fn list_team(&self) -> Result<Vec<User>> {
        self.users.list_all().await
    }

    /// Remove a team member. Tasks and notifications referencing them are
    /// left behind with null references.
    pub async fn remove_member(&self, user_id: i64) -> Result<bool> {
        let deleted = self.users.delete(user_id).await?;

        if deleted {
            info!(user_id = user_id, "User deleted");
        }

        Ok(deleted)
    }

    fn spawn_mirror_sync(&self, user: &User) {
        if let Some(mirror) = &self.mirror {
            let mirror = Arc::clone(mirror);
            let user = user.clone();
            tokio::spawn(async move {
                match mirror.sync_user(&user).await {
                    Ok(()) => logging::log_mirror_result("user", user.id, true, None),
                    Err(e) => logging::log_mirror_result("user", user.id, false, Some(&e.to_string())),
                }
            });
        }
    }
}
