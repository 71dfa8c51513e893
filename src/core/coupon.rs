//! Coupon business logic - validity checks, discount calculation and redemption.
//!
//! `validate_coupon` is pure and returns the reason a coupon cannot be used, so the
//! bot can explain rejections without touching the database.

use crate::{
    entities::{
        Coupon, coupon,
        sea_orm_active_enums::{Continent, CouponType, CustomerTier},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::info;

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CouponRejection {
    /// Switched off by staff
    #[error("coupon is inactive")]
    Inactive,
    /// Validity window has not started
    #[error("coupon is not valid before {0}")]
    NotYetValid(NaiveDate),
    /// Validity window has ended
    #[error("coupon expired on {0}")]
    Expired(NaiveDate),
    /// All redemptions used
    #[error("usage limit of {0} reached")]
    UsageLimitReached(i32),
    /// Booking too small
    #[error("amount {amount:.2} is below the minimum of {min:.2}")]
    BelowMinimum {
        /// Booking amount
        amount: f64,
        /// Required minimum
        min: f64,
    },
    /// Booking too large
    #[error("amount {amount:.2} is above the maximum of {max:.2}")]
    AboveMaximum {
        /// Booking amount
        amount: f64,
        /// Allowed maximum
        max: f64,
    },
    /// Package not on the coupon's list
    #[error("package is not eligible")]
    PackageNotEligible,
    /// Continent not on the coupon's list
    #[error("{0} tours are not eligible")]
    ContinentNotEligible(Continent),
    /// Customer tier too low
    #[error("requires {required} tier, customer is {actual}")]
    TierNotEligible {
        /// Minimum tier
        required: CustomerTier,
        /// Customer's tier
        actual: CustomerTier,
    },
}

/// What a coupon is being checked against.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponContext {
    /// Booking amount before discount
    pub amount: f64,
    /// Booked package
    pub package_id: i64,
    /// Package continent
    pub continent: Continent,
    /// Customer tier
    pub tier: CustomerTier,
    /// Travellers on the booking
    pub participants: i32,
}

/// Redemption counters for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponUsage {
    /// Times redeemed
    pub used: i32,
    /// Maximum redemptions, None when unlimited
    pub limit: Option<i32>,
    /// Redemptions left, None when unlimited
    pub remaining: Option<i32>,
}

/// Input for [`create_coupon`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    /// Code, stored uppercase
    pub code: String,
    /// Discount kind
    pub coupon_type: CouponType,
    /// Percentage or amount
    pub value: f64,
    /// Maximum redemptions
    pub usage_limit: Option<i32>,
    /// Minimum booking amount
    pub min_amount: Option<f64>,
    /// Maximum booking amount
    pub max_amount: Option<f64>,
    /// Eligible package ids, empty for all
    pub applicable_packages: Vec<i64>,
    /// Eligible continents, empty for all
    pub applicable_continents: Vec<Continent>,
    /// Lowest eligible tier
    pub min_tier: Option<CustomerTier>,
    /// First valid day
    pub valid_from: NaiveDate,
    /// Last valid day
    pub valid_until: NaiveDate,
}

impl NewCoupon {
    /// Unrestricted coupon valid between the two dates.
    #[must_use]
    pub fn new(
        code: &str,
        coupon_type: CouponType,
        value: f64,
        valid_from: NaiveDate,
        valid_until: NaiveDate,
    ) -> Self {
        Self {
            code: code.to_string(),
            coupon_type,
            value,
            usage_limit: None,
            min_amount: None,
            max_amount: None,
            applicable_packages: Vec::new(),
            applicable_continents: Vec::new(),
            min_tier: None,
            valid_from,
            valid_until,
        }
    }
}

fn join_list<T: ToString>(items: &[T]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

fn split_list(raw: Option<&str>) -> impl Iterator<Item = &str> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Package ids the coupon is limited to; empty means every package.
#[must_use]
pub fn applicable_packages(coupon: &coupon::Model) -> Vec<i64> {
    split_list(coupon.applicable_packages.as_deref())
        .filter_map(|id| id.parse().ok())
        .collect()
}

/// Continents the coupon is limited to; empty means everywhere.
#[must_use]
pub fn applicable_continents(coupon: &coupon::Model) -> Vec<Continent> {
    split_list(coupon.applicable_continents.as_deref())
        .filter_map(|c| c.parse().ok())
        .collect()
}

/// Redemption counters of a coupon.
#[must_use]
pub fn usage(coupon: &coupon::Model) -> CouponUsage {
    CouponUsage {
        used: coupon.used_count,
        limit: coupon.usage_limit,
        remaining: coupon
            .usage_limit
            .map(|limit| (limit - coupon.used_count).max(0)),
    }
}

/// Discount a coupon type grants on `amount` for `participants` travellers.
///
/// Percentage takes `value` percent; fixed takes `value` capped at the amount;
/// bogo makes one traveller in every pair free; free shipping is worth nothing on a tour.
#[must_use]
pub fn discount_for(coupon_type: CouponType, value: f64, amount: f64, participants: i32) -> f64 {
    match coupon_type {
        CouponType::Percentage => amount * value.clamp(0.0, 100.0) / 100.0,
        CouponType::Fixed => value.min(amount).max(0.0),
        CouponType::Bogo => {
            if participants < 2 {
                0.0
            } else {
                let per_person = amount / f64::from(participants);
                per_person * f64::from(participants / 2)
            }
        }
        CouponType::FreeShipping => 0.0,
    }
}

/// Checks every condition of a coupon against a booking and returns the discount.
///
/// The validity window is inclusive on both ends.
pub fn validate_coupon(
    coupon: &coupon::Model,
    context: &CouponContext,
    today: NaiveDate,
) -> std::result::Result<f64, CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if today < coupon.valid_from {
        return Err(CouponRejection::NotYetValid(coupon.valid_from));
    }
    if today > coupon.valid_until {
        return Err(CouponRejection::Expired(coupon.valid_until));
    }
    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(CouponRejection::UsageLimitReached(limit));
        }
    }
    if let Some(min) = coupon.min_amount {
        if context.amount < min {
            return Err(CouponRejection::BelowMinimum {
                amount: context.amount,
                min,
            });
        }
    }
    if let Some(max) = coupon.max_amount {
        if context.amount > max {
            return Err(CouponRejection::AboveMaximum {
                amount: context.amount,
                max,
            });
        }
    }

    let packages = applicable_packages(coupon);
    if !packages.is_empty() && !packages.contains(&context.package_id) {
        return Err(CouponRejection::PackageNotEligible);
    }

    let continents = applicable_continents(coupon);
    if !continents.is_empty() && !continents.contains(&context.continent) {
        return Err(CouponRejection::ContinentNotEligible(context.continent));
    }

    if let Some(required) = coupon.min_tier {
        if context.tier < required {
            return Err(CouponRejection::TierNotEligible {
                required,
                actual: context.tier,
            });
        }
    }

    Ok(discount_for(
        coupon.coupon_type,
        coupon.value,
        context.amount,
        context.participants,
    ))
}

/// Creates a coupon after validating its value and validity window.
pub async fn create_coupon(db: &DatabaseConnection, new: NewCoupon) -> Result<coupon::Model> {
    let code = new.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::Validation {
            message: "Coupon code cannot be empty".to_string(),
        });
    }
    if !new.value.is_finite() || new.value < 0.0 {
        return Err(Error::InvalidAmount { amount: new.value });
    }
    if new.coupon_type == CouponType::Percentage && new.value > 100.0 {
        return Err(Error::Validation {
            message: format!("Percentage coupons cannot exceed 100%, got {}", new.value),
        });
    }
    if new.valid_from > new.valid_until {
        return Err(Error::InvalidDateRange {
            start: new.valid_from,
            end: new.valid_until,
        });
    }
    if get_coupon_by_code(db, &code).await?.is_some() {
        return Err(Error::Duplicate {
            entity: "Coupon",
            name: code,
        });
    }

    let model = coupon::ActiveModel {
        code: Set(code),
        coupon_type: Set(new.coupon_type),
        value: Set(new.value),
        used_count: Set(0),
        usage_limit: Set(new.usage_limit),
        min_amount: Set(new.min_amount),
        max_amount: Set(new.max_amount),
        applicable_packages: Set(join_list(&new.applicable_packages)),
        applicable_continents: Set(join_list(&new.applicable_continents)),
        min_tier: Set(new.min_tier),
        valid_from: Set(new.valid_from),
        valid_until: Set(new.valid_until),
        is_active: Set(true),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(code = %created.code, coupon_type = %created.coupon_type, "Created coupon");
    Ok(created)
}

/// Finds a coupon by code, ignoring case.
pub async fn get_coupon_by_code(
    db: &DatabaseConnection,
    code: &str,
) -> Result<Option<coupon::Model>> {
    Coupon::find()
        .filter(coupon::Column::Code.eq(code.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a coupon by code inside any connection or transaction.
pub(crate) async fn find_coupon_by_code<C>(db: &C, code: &str) -> Result<coupon::Model>
where
    C: ConnectionTrait,
{
    Coupon::find()
        .filter(coupon::Column::Code.eq(code.trim().to_uppercase()))
        .one(db)
        .await?
        .ok_or_else(|| Error::CouponNotFound {
            code: code.to_string(),
        })
}

/// Lists all coupons alphabetically by code.
pub async fn list_coupons(db: &DatabaseConnection) -> Result<Vec<coupon::Model>> {
    Coupon::find()
        .order_by_asc(coupon::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Switches a coupon on or off.
pub async fn set_coupon_active(
    db: &DatabaseConnection,
    code: &str,
    active: bool,
) -> Result<coupon::Model> {
    let existing = find_coupon_by_code(db, code).await?;
    let mut active_model: coupon::ActiveModel = existing.into();
    active_model.is_active = Set(active);
    active_model.update(db).await.map_err(Into::into)
}

/// Counts one redemption with a single `UPDATE ... SET used_count = used_count + 1`.
pub(crate) async fn redeem_coupon<C>(db: &C, coupon_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Coupon::update_many()
        .col_expr(
            coupon::Column::UsedCount,
            Expr::col(coupon::Column::UsedCount).add(1),
        )
        .filter(coupon::Column::Id.eq(coupon_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::CouponNotFound {
            code: coupon_id.to_string(),
        });
    }

    Ok(())
}
