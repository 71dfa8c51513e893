//! User entity - Staff and customer accounts, keyed by Discord user id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Role;

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user id
    #[sea_orm(unique)]
    pub discord_id: String,
    /// Display name
    pub name: String,
    /// Role deciding which menus and actions are available
    pub role: Role,
    /// Deactivated users cannot open a session
    pub is_active: bool,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// `User` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
