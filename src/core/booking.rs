//! Booking business logic - creation, lookup, lifecycle and payment recording.
//!
//! Bookings are never deleted; cancellation and refunds are status changes.
//! Recorded payments can never push `paid_amount` past `total_amount`.

use crate::{
    core::{coupon, package},
    entities::{
        Booking, Installment, booking, installment,
        sea_orm_active_enums::{BookingStatus, CustomerTier, PaymentStatus},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*};
use tracing::{info, warn};

/// Payments within this distance of the total are treated as settling it exactly,
/// absorbing floating point drift from evenly split plans.
const CENT_TOLERANCE: f64 = 0.005;

/// Customer details captured on a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    /// External customer reference
    pub id: String,
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Classification
    pub tier: CustomerTier,
}

/// Input for [`create_booking`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    /// Who is travelling
    pub customer: CustomerInfo,
    /// Package being booked
    pub package_id: i64,
    /// First day of travel
    pub travel_start: NaiveDate,
    /// Last day of travel
    pub travel_end: NaiveDate,
    /// Number of travellers, at least one
    pub participants: i32,
    /// Overrides `base_price × participants` when set
    pub total_override: Option<f64>,
    /// ISO currency code
    pub currency: String,
}

/// Loads a booking by id inside any connection or transaction.
pub(crate) async fn find_booking<C>(db: &C, booking_id: i64) -> Result<booking::Model>
where
    C: ConnectionTrait,
{
    Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::BookingNotFound {
            reference: booking_id.to_string(),
        })
}

/// Formats the booking number for the `sequence`-th booking of `year`.
#[must_use]
pub fn format_booking_number(year: i32, sequence: u64) -> String {
    format!("BK-{year}-{sequence:04}")
}

/// Fails with [`Error::PlanExists`] when the booking already carries installments.
///
/// Once a plan is stored, the booking total and ad-hoc payments are frozen.
pub(crate) async fn ensure_no_plan<C>(db: &C, booking: &booking::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    let rows = Installment::find()
        .filter(installment::Column::BookingId.eq(booking.id))
        .count(db)
        .await?;
    if rows > 0 {
        return Err(Error::PlanExists {
            booking_number: booking.booking_number.clone(),
        });
    }
    Ok(())
}

/// Highest sequence already used in `BK-<year>-`, or 0.
async fn last_sequence<C>(db: &C, year: i32) -> Result<u64>
where
    C: ConnectionTrait,
{
    let prefix = format!("BK-{year}-");
    let numbers: Vec<String> = Booking::find()
        .select_only()
        .column(booking::Column::BookingNumber)
        .filter(booking::Column::BookingNumber.starts_with(&prefix))
        .into_tuple()
        .all(db)
        .await?;

    Ok(numbers
        .iter()
        .filter_map(|number| number.strip_prefix(&prefix)?.parse::<u64>().ok())
        .max()
        .unwrap_or(0))
}

/// Creates a booking in the `inquiry` state with nothing paid, numbered for the
/// current year.
pub async fn create_booking(db: &DatabaseConnection, new: NewBooking) -> Result<booking::Model> {
    create_booking_at(db, new, Utc::now()).await
}

/// Creates a booking as of `now`.
///
/// Validates the traveller count and dates, requires an active package, and assigns the
/// next booking number for `now`'s year. A number taken by a concurrent insert is
/// retried once; a second clash is reported as [`Error::Duplicate`].
pub async fn create_booking_at(
    db: &DatabaseConnection,
    new: NewBooking,
    now: DateTime<Utc>,
) -> Result<booking::Model> {
    if new.customer.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Customer name cannot be empty".to_string(),
        });
    }

    if new.participants < 1 {
        return Err(Error::Validation {
            message: format!("Participants must be at least 1, got {}", new.participants),
        });
    }

    if new.travel_start > new.travel_end {
        return Err(Error::InvalidDateRange {
            start: new.travel_start,
            end: new.travel_end,
        });
    }

    let package = package::find_package(db, new.package_id).await?;
    if !package.is_active {
        return Err(Error::PackageNotFound {
            reference: package.name,
        });
    }

    let total_amount = new
        .total_override
        .unwrap_or(package.base_price * f64::from(new.participants));
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_amount,
        });
    }

    let year = now.year();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let txn = db.begin().await?;
        let booking_number = format_booking_number(year, last_sequence(&txn, year).await? + 1);

        let model = booking::ActiveModel {
            booking_number: Set(booking_number.clone()),
            customer_id: Set(new.customer.id.clone()),
            customer_name: Set(new.customer.name.trim().to_string()),
            customer_email: Set(new.customer.email.clone()),
            customer_phone: Set(new.customer.phone.clone()),
            customer_tier: Set(new.customer.tier),
            package_id: Set(package.id),
            travel_start: Set(new.travel_start),
            travel_end: Set(new.travel_end),
            participants: Set(new.participants),
            status: Set(BookingStatus::Inquiry),
            payment_status: Set(PaymentStatus::Pending),
            total_amount: Set(total_amount),
            paid_amount: Set(0.0),
            currency: Set(new.currency.clone()),
            coupon_code: Set(None),
            created_at: Set(now),
            ..Default::default()
        };

        match model.insert(&txn).await {
            Ok(created) => {
                txn.commit().await?;
                info!(
                    booking = %created.booking_number,
                    package = %package.name,
                    total = created.total_amount,
                    "Created booking"
                );
                return Ok(created);
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                txn.rollback().await?;
                if attempt > 1 {
                    return Err(Error::Duplicate {
                        entity: "Booking",
                        name: booking_number,
                    });
                }
                warn!(booking = %booking_number, "Booking number taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Finds a booking by its unique ID.
pub async fn get_booking_by_id(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<Option<booking::Model>> {
    Booking::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a booking by its booking number (case-insensitive on input).
pub async fn get_booking_by_number(
    db: &DatabaseConnection,
    booking_number: &str,
) -> Result<Option<booking::Model>> {
    Booking::find()
        .filter(booking::Column::BookingNumber.eq(booking_number.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists bookings, newest first, optionally restricted to one status.
pub async fn list_bookings(
    db: &DatabaseConnection,
    status: Option<BookingStatus>,
) -> Result<Vec<booking::Model>> {
    let mut query = Booking::find();
    if let Some(status) = status {
        query = query.filter(booking::Column::Status.eq(status));
    }

    query
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a booking along its lifecycle.
///
/// Allowed: inquiry → confirmed | cancelled, confirmed → completed | cancelled.
pub async fn update_booking_status(
    db: &DatabaseConnection,
    booking_id: i64,
    new_status: BookingStatus,
) -> Result<booking::Model> {
    let existing = find_booking(db, booking_id).await?;

    if !existing.status.can_transition_to(new_status) {
        return Err(Error::InvalidTransition {
            entity: "booking",
            from: existing.status.to_string(),
            to: new_status.to_string(),
        });
    }

    let from = existing.status;
    let mut active_model: booking::ActiveModel = existing.into();
    active_model.status = Set(new_status);
    let updated = active_model.update(db).await?;

    info!(booking = %updated.booking_number, %from, to = %new_status, "Booking status changed");

    Ok(updated)
}

/// Adds `amount` to a booking's paid total inside the caller's transaction and
/// recomputes the payment status.
pub(crate) async fn apply_payment<C>(db: &C, booking_id: i64, amount: f64) -> Result<booking::Model>
where
    C: ConnectionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let existing = find_booking(db, booking_id).await?;

    if matches!(existing.status, BookingStatus::Cancelled)
        || existing.payment_status == PaymentStatus::Refunded
    {
        return Err(Error::Validation {
            message: format!(
                "booking {} is cancelled and cannot take payments",
                existing.booking_number
            ),
        });
    }

    let mut new_paid = existing.paid_amount + amount;
    if new_paid > existing.total_amount + CENT_TOLERANCE {
        return Err(Error::Overpayment {
            paid: existing.paid_amount,
            amount,
            total: existing.total_amount,
        });
    }
    if (existing.total_amount - new_paid).abs() < CENT_TOLERANCE {
        new_paid = existing.total_amount;
    }

    let payment_status = PaymentStatus::from_amounts(new_paid, existing.total_amount);

    let mut active_model: booking::ActiveModel = existing.into();
    active_model.paid_amount = Set(new_paid);
    active_model.payment_status = Set(payment_status);
    active_model.update(db).await.map_err(Into::into)
}

/// Records a payment against a booking outside any installment plan.
///
/// Bookings with a stored plan are paid through their installments instead.
pub async fn record_payment(
    db: &DatabaseConnection,
    booking_id: i64,
    amount: f64,
) -> Result<booking::Model> {
    let txn = db.begin().await?;
    let existing = find_booking(&txn, booking_id).await?;
    ensure_no_plan(&txn, &existing).await?;
    let updated = apply_payment(&txn, booking_id, amount).await?;
    txn.commit().await?;

    info!(
        booking = %updated.booking_number,
        amount,
        paid = updated.paid_amount,
        status = %updated.payment_status,
        "Payment recorded"
    );

    Ok(updated)
}

/// Cancels a booking and marks its payments refunded.
///
/// Completed bookings cannot be refunded.
pub async fn refund_booking(db: &DatabaseConnection, booking_id: i64) -> Result<booking::Model> {
    let existing = find_booking(db, booking_id).await?;

    if existing.status == BookingStatus::Completed {
        return Err(Error::InvalidTransition {
            entity: "booking",
            from: existing.status.to_string(),
            to: BookingStatus::Cancelled.to_string(),
        });
    }

    let refunded_amount = existing.paid_amount;
    let mut active_model: booking::ActiveModel = existing.into();
    active_model.status = Set(BookingStatus::Cancelled);
    active_model.payment_status = Set(PaymentStatus::Refunded);
    let updated = active_model.update(db).await?;

    warn!(booking = %updated.booking_number, refunded_amount, "Booking refunded");

    Ok(updated)
}

/// Validates a coupon for a booking, lowers the booking total by the discount and
/// counts the redemption, all in one transaction.
///
/// Coupons apply before any payment and before a payment plan is stored.
///
/// Returns the updated booking and the discount granted.
pub async fn apply_coupon(
    db: &DatabaseConnection,
    booking_id: i64,
    code: &str,
    today: NaiveDate,
) -> Result<(booking::Model, f64)> {
    let txn = db.begin().await?;

    let existing = find_booking(&txn, booking_id).await?;
    if existing.coupon_code.is_some() {
        return Err(Error::Validation {
            message: format!("booking {} already has a coupon", existing.booking_number),
        });
    }
    if existing.paid_amount > 0.0 {
        return Err(Error::Validation {
            message: format!(
                "booking {} already has payments; coupons apply before payment",
                existing.booking_number
            ),
        });
    }
    ensure_no_plan(&txn, &existing).await?;

    let package = package::find_package(&txn, existing.package_id).await?;
    let found = coupon::find_coupon_by_code(&txn, code).await?;
    let context = coupon::CouponContext {
        amount: existing.total_amount,
        package_id: package.id,
        continent: package.continent,
        tier: existing.customer_tier,
        participants: existing.participants,
    };

    let discount = coupon::validate_coupon(&found, &context, today).map_err(|reason| {
        warn!(code = %found.code, %reason, "Coupon rejected");
        Error::CouponRejected {
            code: found.code.clone(),
            reason,
        }
    })?;

    coupon::redeem_coupon(&txn, found.id).await?;

    let new_total = existing.total_amount - discount;
    let mut active_model: booking::ActiveModel = existing.into();
    active_model.total_amount = Set(new_total);
    active_model.coupon_code = Set(Some(found.code.clone()));
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;

    info!(booking = %updated.booking_number, code = %found.code, discount, "Coupon applied");

    Ok((updated, discount))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::sea_orm_active_enums::{Continent, CouponType};
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_booking_number() {
        assert_eq!(format_booking_number(2024, 7), "BK-2024-0007");
        assert_eq!(format_booking_number(2025, 12_345), "BK-2025-12345");
    }

    #[tokio::test]
    async fn test_create_booking_prices_from_package() -> Result<()> {
        let db = setup_test_db().await?;
        let pkg = create_test_package(&db, "Kyoto Autumn", 2_480.0).await?;

        let mut new = test_new_booking(pkg.id);
        new.participants = 10;
        new.total_override = None;
        let created = create_booking(&db, new).await?;

        assert_eq!(created.total_amount, 24_800.0);
        assert_eq!(created.paid_amount, 0.0);
        assert_eq!(created.status, BookingStatus::Inquiry);
        assert_eq!(created.payment_status, PaymentStatus::Pending);
        assert!(created.booking_number.ends_with("-0001"));

        Ok(())
    }

    #[tokio::test]
    async fn test_booking_numbers_are_sequential() -> Result<()> {
        let db = setup_test_db().await?;
        let pkg = create_test_package(&db, "Lisbon Weekend", 800.0).await?;

        let first = create_booking(&db, test_new_booking(pkg.id)).await?;
        let second = create_booking(&db, test_new_booking(pkg.id)).await?;

        assert!(first.booking_number.ends_with("-0001"));
        assert!(second.booking_number.ends_with("-0002"));

        let found = get_booking_by_number(&db, &second.booking_number.to_lowercase()).await?;
        assert_eq!(found.unwrap().id, second.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_booking_numbers_follow_creation_year() -> Result<()> {
        use chrono::TimeZone;

        let db = setup_test_db().await?;
        let pkg = create_test_package(&db, "Lisbon Weekend", 800.0).await?;
        let new_year_eve = Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap();
        let new_year = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

        let first = create_booking_at(&db, test_new_booking(pkg.id), new_year_eve).await?;
        let next_year = create_booking_at(&db, test_new_booking(pkg.id), new_year).await?;
        let second = create_booking_at(&db, test_new_booking(pkg.id), new_year_eve).await?;

        assert_eq!(first.booking_number, "BK-2023-0001");
        assert_eq!(next_year.booking_number, "BK-2024-0001");
        assert_eq!(second.booking_number, "BK-2023-0002");

        Ok(())
    }

    #[tokio::test]
    async fn test_booking_number_skips_past_highest_sequence() -> Result<()> {
        use chrono::TimeZone;

        let db = setup_test_db().await?;
        let pkg = create_test_package(&db, "Lisbon Weekend", 800.0).await?;
        let when = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();

        let first = create_booking_at(&db, test_new_booking(pkg.id), when).await?;
        create_booking_at(&db, test_new_booking(pkg.id), when).await?;

        // Only two rows, but 0003 is already taken
        let mut renumbered: booking::ActiveModel = first.into();
        renumbered.booking_number = Set("BK-2024-0003".to_string());
        renumbered.update(&db).await?;

        let third = create_booking_at(&db, test_new_booking(pkg.id), when).await?;
        assert_eq!(third.booking_number, "BK-2024-0004");

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let pkg = create_test_package(&db, "Cape Town", 1_500.0).await?;

        let mut no_people = test_new_booking(pkg.id);
        no_people.participants = 0;
        assert!(matches!(
            create_booking(&db, no_people).await,
            Err(Error::Validation { .. })
        ));

        let mut backwards = test_new_booking(pkg.id);
        backwards.travel_start = date(2024, 6, 20);
        backwards.travel_end = date(2024, 6, 10);
        assert!(matches!(
            create_booking(&db, backwards).await,
            Err(Error::InvalidDateRange { .. })
        ));

        let missing_package = test_new_booking(999);
        assert!(matches!(
            create_booking(&db, missing_package).await,
            Err(Error::PackageNotFound { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_status_lifecycle() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;

        let confirmed = update_booking_status(&db, booking.id, BookingStatus::Confirmed).await?;
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let back = update_booking_status(&db, booking.id, BookingStatus::Inquiry).await;
        assert!(matches!(back, Err(Error::InvalidTransition { .. })));

        let done = update_booking_status(&db, booking.id, BookingStatus::Completed).await?;
        assert_eq!(done.status, BookingStatus::Completed);

        let refund = refund_booking(&db, booking.id).await;
        assert!(matches!(refund, Err(Error::InvalidTransition { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_payment_and_overpayment() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;

        let partial = record_payment(&db, booking.id, 2_000.0).await?;
        assert_eq!(partial.paid_amount, 2_000.0);
        assert_eq!(partial.payment_status, PaymentStatus::Partial);

        let too_much = record_payment(&db, booking.id, 3_000.01).await;
        assert!(matches!(too_much, Err(Error::Overpayment { .. })));

        let settled = record_payment(&db, booking.id, 3_000.0).await?;
        assert_eq!(settled.payment_status, PaymentStatus::Paid);

        let zero = record_payment(&db, booking.id, 0.0).await;
        assert!(matches!(zero, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_refund_blocks_further_payments() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;
        record_payment(&db, booking.id, 1_000.0).await?;

        let refunded = refund_booking(&db, booking.id).await?;
        assert_eq!(refunded.status, BookingStatus::Cancelled);
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);

        let after = record_payment(&db, booking.id, 100.0).await;
        assert!(matches!(after, Err(Error::Validation { .. })));

        // Still there: bookings are never deleted
        assert!(get_booking_by_id(&db, booking.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_bookings_by_status() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;
        let other = create_booking(&db, test_new_booking(booking.package_id)).await?;
        update_booking_status(&db, other.id, BookingStatus::Confirmed).await?;

        assert_eq!(list_bookings(&db, None).await?.len(), 2);
        let inquiries = list_bookings(&db, Some(BookingStatus::Inquiry)).await?;
        assert_eq!(inquiries.len(), 1);
        assert_eq!(inquiries[0].id, booking.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_coupon_lowers_total_once() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;
        create_test_coupon(&db, "SPRING10", CouponType::Percentage, 10.0).await?;
        let today = date(2024, 3, 1);

        let (updated, discount) = apply_coupon(&db, booking.id, "spring10", today).await?;
        assert_eq!(discount, 500.0);
        assert_eq!(updated.total_amount, 4_500.0);
        assert_eq!(updated.coupon_code.as_deref(), Some("SPRING10"));

        let coupon = coupon::get_coupon_by_code(&db, "SPRING10").await?.unwrap();
        assert_eq!(coupon.used_count, 1);

        let twice = apply_coupon(&db, booking.id, "SPRING10", today).await;
        assert!(matches!(twice, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_apply_coupon_rejection_is_not_redeemed() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;
        let mut new = coupon::NewCoupon::new(
            "ASIAONLY",
            CouponType::Fixed,
            200.0,
            date(2024, 1, 1),
            date(2024, 12, 31),
        );
        new.applicable_continents = vec![Continent::Asia];
        coupon::create_coupon(&db, new).await?;

        // Test package is in Europe
        let result = apply_coupon(&db, booking.id, "ASIAONLY", date(2024, 3, 1)).await;
        assert!(matches!(result, Err(Error::CouponRejected { .. })));

        let coupon = coupon::get_coupon_by_code(&db, "ASIAONLY").await?.unwrap();
        assert_eq!(coupon.used_count, 0);

        Ok(())
    }
}
