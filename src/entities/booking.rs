//! Booking entity - A reservation of a package by a customer.
//!
//! The customer is stored inline with the booking; the package is referenced by id.
//! `paid_amount` never exceeds `total_amount` (enforced in `core::booking`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BookingStatus, CustomerTier, PaymentStatus};

/// Booking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing reference, e.g. `BK-2024-0007`
    #[sea_orm(unique)]
    pub booking_number: String,
    /// External customer reference
    pub customer_id: String,
    /// Customer full name
    pub customer_name: String,
    /// Customer email
    pub customer_email: String,
    /// Customer phone, used for messaging links
    pub customer_phone: String,
    /// Customer classification
    pub customer_tier: CustomerTier,
    /// Booked package
    pub package_id: i64,
    /// First day of travel
    pub travel_start: Date,
    /// Last day of travel
    pub travel_end: Date,
    /// Number of travellers
    pub participants: i32,
    /// Reservation lifecycle state
    pub status: BookingStatus,
    /// Settlement state
    pub payment_status: PaymentStatus,
    /// Amount owed for the whole booking
    pub total_amount: f64,
    /// Amount collected so far
    pub paid_amount: f64,
    /// ISO currency code
    pub currency: String,
    /// Coupon applied to this booking, if any
    pub coupon_code: Option<String>,
    /// When the booking was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking belongs to one package
    #[sea_orm(
        belongs_to = "super::package::Entity",
        from = "Column::PackageId",
        to = "super::package::Column::Id"
    )]
    Package,
    /// One booking has many installments
    #[sea_orm(has_many = "super::installment::Entity")]
    Installments,
    /// One booking can have several guide assignments
    #[sea_orm(has_many = "super::guide_assignment::Entity")]
    Assignments,
}

impl Related<super::package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Package.def()
    }
}

impl Related<super::installment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Installments.def()
    }
}

impl Related<super::guide_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
