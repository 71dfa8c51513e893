//! Itinerary day entity - One day of a guided tour's plan.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Itinerary day database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "itinerary_days")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Assignment this day belongs to
    pub assignment_id: i64,
    /// 1-based day of the tour
    pub day_number: i32,
    /// Short title (e.g., "Arrival and Gion walk")
    pub title: String,
    /// Free-form activities for the day
    pub activities: String,
}

/// Defines relationships between `ItineraryDay` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each day belongs to one assignment
    #[sea_orm(
        belongs_to = "super::guide_assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::guide_assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::guide_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
