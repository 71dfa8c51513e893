//! Staff accounts and per-request sessions.
//!
//! There is no ambient "current user". Each caller opens a [`StaffSession`] for the
//! Discord account acting, checks access through it, and drops it when done.

use crate::{
    core::permissions::{self, MenuItem, Permission},
    entities::{User, sea_orm_active_enums::Role, user},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, warn};

async fn find_user(db: &DatabaseConnection, discord_id: &str) -> Result<user::Model> {
    get_user_by_discord_id(db, discord_id)
        .await?
        .ok_or_else(|| Error::UserNotFound {
            discord_id: discord_id.to_string(),
        })
}

/// Registers a user for a Discord account.
pub async fn create_user(
    db: &DatabaseConnection,
    discord_id: String,
    name: String,
    role: Role,
) -> Result<user::Model> {
    let discord_id = discord_id.trim().to_string();
    if discord_id.is_empty() {
        return Err(Error::Validation {
            message: "Discord id cannot be empty".to_string(),
        });
    }
    if get_user_by_discord_id(db, &discord_id).await?.is_some() {
        return Err(Error::Duplicate {
            entity: "User",
            name: discord_id,
        });
    }

    let model = user::ActiveModel {
        discord_id: Set(discord_id),
        name: Set(name.trim().to_string()),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(user = %created.name, %role, "Created user");
    Ok(created)
}

/// Finds a user by Discord id, active or not.
pub async fn get_user_by_discord_id(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::DiscordId.eq(discord_id.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Changes a user's role.
pub async fn set_user_role(
    db: &DatabaseConnection,
    discord_id: &str,
    role: Role,
) -> Result<user::Model> {
    let existing = find_user(db, discord_id).await?;
    let from = existing.role;
    let mut active_model: user::ActiveModel = existing.into();
    active_model.role = Set(role);
    let updated = active_model.update(db).await?;
    info!(user = %updated.name, %from, to = %role, "Role changed");
    Ok(updated)
}

/// All users, by name.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Blocks a user from opening sessions.
pub async fn deactivate_user(db: &DatabaseConnection, discord_id: &str) -> Result<user::Model> {
    let existing = find_user(db, discord_id).await?;
    let mut active_model: user::ActiveModel = existing.into();
    active_model.is_active = Set(false);
    let updated = active_model.update(db).await?;
    warn!(user = %updated.name, "User deactivated");
    Ok(updated)
}

/// The authenticated user behind one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSession {
    user: user::Model,
}

impl StaffSession {
    /// Opens a session for an active user.
    ///
    /// # Errors
    /// `Error::UserNotFound` when the account is unknown or deactivated.
    pub async fn init(db: &DatabaseConnection, discord_id: &str) -> Result<Self> {
        let user = find_user(db, discord_id).await?;
        if !user.is_active {
            return Err(Error::UserNotFound {
                discord_id: discord_id.to_string(),
            });
        }
        debug!(user = %user.name, role = %user.role, "Session opened");
        Ok(Self { user })
    }

    /// Re-reads the user, picking up role changes and deactivation.
    pub async fn refresh(&mut self, db: &DatabaseConnection) -> Result<()> {
        let discord_id = self.user.discord_id.clone();
        *self = Self::init(db, &discord_id).await?;
        Ok(())
    }

    /// The signed-in user
    #[must_use]
    pub const fn user(&self) -> &user::Model {
        &self.user
    }

    /// The signed-in user's role
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }

    /// Menu items this session may open.
    #[must_use]
    pub fn menu(&self) -> &'static [MenuItem] {
        permissions::accessible_menu_items(self.user.role)
    }

    /// Fails unless the session may open `item`.
    pub fn require(&self, item: MenuItem) -> Result<()> {
        if permissions::has_menu_access(self.user.role, item) {
            return Ok(());
        }
        warn!(user = %self.user.name, role = %self.user.role, menu = %item, "Access denied");
        Err(Error::PermissionDenied {
            role: self.user.role.to_string(),
            resource: item.to_string(),
        })
    }

    /// Fails unless the session may perform `permission`.
    pub fn require_permission(&self, permission: Permission) -> Result<()> {
        if permissions::has_permission(self.user.role, permission) {
            return Ok(());
        }
        warn!(user = %self.user.name, role = %self.user.role, %permission, "Access denied");
        Err(Error::PermissionDenied {
            role: self.user.role.to_string(),
            resource: permission.to_string(),
        })
    }
}
