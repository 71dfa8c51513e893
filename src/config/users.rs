//! Bootstrap of the first staff account from environment variables.
//!
//! A fresh database has no users, so nobody could run `/user add`. Setting
//! `SUPER_ADMIN_DISCORD_ID` (and optionally `SUPER_ADMIN_NAME`) in `.env` creates or
//! promotes that account to super admin on startup.

use crate::{
    core::user,
    entities::{sea_orm_active_enums::Role, user as user_entity},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

/// Reads the configured super admin as `(discord_id, name)`.
///
/// Returns `None` when `SUPER_ADMIN_DISCORD_ID` is unset or blank.
#[must_use]
pub fn get_super_admin() -> Option<(String, String)> {
    let discord_id = std::env::var("SUPER_ADMIN_DISCORD_ID").ok()?;
    if discord_id.trim().is_empty() {
        return None;
    }
    let name = std::env::var("SUPER_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
    Some((discord_id.trim().to_string(), name))
}

/// Makes sure `discord_id` exists, is active and holds the super admin role.
pub async fn ensure_super_admin_account(
    db: &DatabaseConnection,
    discord_id: &str,
    name: &str,
) -> Result<user_entity::Model> {
    match user::get_user_by_discord_id(db, discord_id).await? {
        Some(existing) if existing.role == Role::SuperAdmin && existing.is_active => Ok(existing),
        Some(existing) => {
            if !existing.is_active {
                warn!(user = %existing.name, "Configured super admin was deactivated; keeping them inactive");
                return Ok(existing);
            }
            user::set_user_role(db, discord_id, Role::SuperAdmin).await
        }
        None => {
            let created =
                user::create_user(db, discord_id.to_string(), name.to_string(), Role::SuperAdmin)
                    .await?;
            info!(user = %created.name, "Bootstrapped super admin");
            Ok(created)
        }
    }
}

/// Applies [`ensure_super_admin_account`] for the account configured in the environment.
pub async fn ensure_super_admin(db: &DatabaseConnection) -> Result<Option<user_entity::Model>> {
    let Some((discord_id, name)) = get_super_admin() else {
        warn!("SUPER_ADMIN_DISCORD_ID is not set; no staff account will be bootstrapped");
        return Ok(None);
    };

    ensure_super_admin_account(db, &discord_id, &name)
        .await
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_bootstrap_creates_super_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = ensure_super_admin_account(&db, "42", "Owner").await?;
        assert_eq!(admin.role, Role::SuperAdmin);

        let again = ensure_super_admin_account(&db, "42", "Owner").await?;
        assert_eq!(again.id, admin.id);
        assert_eq!(user::list_users(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_promotes_existing_user() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "42", Role::Finance).await?;

        let admin = ensure_super_admin_account(&db, "42", "Owner").await?;
        assert_eq!(admin.role, Role::SuperAdmin);

        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_leaves_deactivated_user_alone() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "42", Role::Finance).await?;
        user::deactivate_user(&db, "42").await?;

        let kept = ensure_super_admin_account(&db, "42", "Owner").await?;
        assert!(!kept.is_active);
        assert_eq!(kept.role, Role::Finance);

        Ok(())
    }
}
