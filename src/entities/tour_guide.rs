//! Tour guide entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tour guide database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tour_guides")]
pub struct Model {
    /// Unique identifier for the guide
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name, unique among guides
    #[sea_orm(unique)]
    pub name: String,
    /// Comma-separated languages spoken (e.g., "english,japanese")
    pub languages: String,
    /// Contact phone
    pub phone: String,
    /// Soft delete flag
    pub is_active: bool,
}

/// Defines relationships between `TourGuide` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One guide has many assignments
    #[sea_orm(has_many = "super::guide_assignment::Entity")]
    Assignments,
}

impl Related<super::guide_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
