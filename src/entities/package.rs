//! Package entity - A sellable tour package in the agency catalog.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::Continent;

/// Package database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    /// Unique identifier for the package
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique among packages (e.g., "Kyoto Autumn Highlights")
    #[sea_orm(unique)]
    pub name: String,
    /// Continent the tour takes place on
    pub continent: Continent,
    /// Length of the tour in days
    pub duration_days: i32,
    /// Price per participant
    pub base_price: f64,
    /// Soft delete flag - inactive packages cannot be booked
    pub is_active: bool,
}

/// Defines relationships between Package and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One package has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
