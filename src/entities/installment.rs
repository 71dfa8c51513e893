//! Installment entity - One scheduled payment in a booking's payment plan.
//!
//! `status` is a cache: only `paid` is authoritative, everything else is
//! recomputed from `due_date` at read time (see `core::payment`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{InstallmentStatus, PaymentMethod};

/// Installment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "installments")]
pub struct Model {
    /// Unique identifier for the installment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Booking whose plan this installment belongs to
    pub booking_id: i64,
    /// 1-based position in the plan
    pub installment_number: i32,
    /// Amount due
    pub amount: f64,
    /// Date the payment is due
    pub due_date: Date,
    /// Cached status
    pub status: InstallmentStatus,
    /// When it was paid
    pub paid_date: Option<Date>,
    /// How it was paid
    pub method: Option<PaymentMethod>,
}

/// Defines relationships between Installment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each installment belongs to one booking
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
