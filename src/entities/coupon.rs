//! Coupon entity - Discount codes redeemable against bookings.
//!
//! Applicability lists are stored as comma-separated values; an empty or
//! missing list means "no restriction".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CouponType, CustomerTier};

/// Coupon database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Redemption code, stored uppercase
    #[sea_orm(unique)]
    pub code: String,
    /// Discount kind
    pub coupon_type: CouponType,
    /// Percentage (0-100) or fixed amount depending on `coupon_type`
    pub value: f64,
    /// Times redeemed
    pub used_count: i32,
    /// Maximum redemptions, None for unlimited
    pub usage_limit: Option<i32>,
    /// Minimum booking amount
    pub min_amount: Option<f64>,
    /// Maximum booking amount
    pub max_amount: Option<f64>,
    /// Comma-separated package ids the coupon applies to
    pub applicable_packages: Option<String>,
    /// Comma-separated continents the coupon applies to
    pub applicable_continents: Option<String>,
    /// Lowest customer tier allowed to redeem
    pub min_tier: Option<CustomerTier>,
    /// First valid day (inclusive)
    pub valid_from: Date,
    /// Last valid day (inclusive)
    pub valid_until: Date,
    /// Manual on/off switch
    pub is_active: bool,
}

/// Coupons have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
