//! Guide assignment entity - A guide leading the tour of one booking.
//!
//! Overlapping assignments for the same guide are allowed; they are only
//! reported as conflicts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AssignmentStatus;

/// Guide assignment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guide_assignments")]
pub struct Model {
    /// Unique identifier for the assignment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Assigned guide
    pub guide_id: i64,
    /// Booking being guided
    pub booking_id: i64,
    /// Destination label shown to the guide (e.g., "Kyoto")
    pub destination: String,
    /// First day of the tour
    pub tour_start: Date,
    /// Last day of the tour
    pub tour_end: Date,
    /// Number of travellers in the group
    pub group_size: i32,
    /// Assignment state
    pub status: AssignmentStatus,
}

/// Defines relationships between `GuideAssignment` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment belongs to one guide
    #[sea_orm(
        belongs_to = "super::tour_guide::Entity",
        from = "Column::GuideId",
        to = "super::tour_guide::Column::Id"
    )]
    Guide,
    /// Each assignment belongs to one booking
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
    /// One assignment has an ordered itinerary
    #[sea_orm(has_many = "super::itinerary_day::Entity")]
    ItineraryDays,
}

impl Related<super::tour_guide::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guide.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl Related<super::itinerary_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItineraryDays.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
