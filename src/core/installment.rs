//! Installment plan business logic.
//!
//! Derives the payment options offered for a booking (an even installment plan and a
//! deposit plan) and persists the one the customer picks as installment rows.
//!
//! The two options use different anchors: installment due dates count forward from the
//! day the plan is made, while the deposit plan's balance date counts back from
//! departure. Only one option is ever persisted for a booking, so the anchors never mix.

use crate::{
    core::{booking, payment},
    entities::{
        Installment, booking as booking_entity, installment,
        sea_orm_active_enums::{BookingStatus, InstallmentStatus, PaymentMethod},
    },
    errors::{Error, Result},
};
use chrono::{Days, Months, NaiveDate};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;

/// Thresholds and amounts driving plan derivation. Loaded from `[payment_policy]`
/// in the agency config; every field falls back to the standard agency terms.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaymentPolicy {
    /// Totals strictly below this get three installments and the small deposit
    pub small_booking_limit: f64,
    /// Totals up to and including this get four installments; above get six
    pub large_booking_limit: f64,
    /// Deposit for totals below `small_booking_limit`
    pub small_deposit: f64,
    /// Deposit for everything else
    pub standard_deposit: f64,
    /// Days before departure the deposit plan's balance is due
    pub balance_lead_days: u64,
    /// Unpaid installments due within this many days are shown as pending
    pub pending_window_days: i64,
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            small_booking_limit: 10_000.0,
            large_booking_limit: 30_000.0,
            small_deposit: 500.0,
            standard_deposit: 1000.0,
            balance_lead_days: 60,
            pending_window_days: 30,
        }
    }
}

impl PaymentPolicy {
    /// Number of equal installments for a total.
    #[must_use]
    pub fn number_of_payments(&self, total_amount: f64) -> u32 {
        if total_amount < self.small_booking_limit {
            3
        } else if total_amount <= self.large_booking_limit {
            4
        } else {
            6
        }
    }

    /// Upfront deposit for a total.
    #[must_use]
    pub fn deposit_for(&self, total_amount: f64) -> f64 {
        if total_amount < self.small_booking_limit {
            self.small_deposit
        } else {
            self.standard_deposit
        }
    }
}

/// Even split of the total over monthly payments.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentPlan {
    /// How many payments
    pub number_of_payments: u32,
    /// Always 0 - no tier charges interest
    pub interest_rate: f64,
    /// `total / number_of_payments`, unrounded
    pub installment_amount: f64,
    /// One due date per payment, `today + i months`
    pub due_dates: Vec<NaiveDate>,
}

/// Deposit now, balance before departure.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositPlan {
    /// Paid upfront
    pub deposit_amount: f64,
    /// Remainder, never negative
    pub balance_amount: f64,
    /// Departure minus the policy's lead days
    pub balance_due_date: NaiveDate,
}

/// Both payment options for one booking.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentStructureOptions {
    /// Amount being planned
    pub total_amount: f64,
    /// Monthly installment option
    pub installments: InstallmentPlan,
    /// Deposit + balance option
    pub deposit: DepositPlan,
}

/// Which of the derived options to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChoice {
    /// Equal monthly installments
    Installments,
    /// Deposit plus balance before departure
    Deposit,
}

impl FromStr for PlanChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "installments" | "installment" => Ok(Self::Installments),
            "deposit" => Ok(Self::Deposit),
            other => Err(Error::Validation {
                message: format!("unknown plan '{other}', expected 'installments' or 'deposit'"),
            }),
        }
    }
}

/// Derives the payment options for `total_amount` departing on `departure_date`.
///
/// Tiering: below 10 000 → 3 payments and a 500 deposit; 10 000 to 30 000 inclusive →
/// 4 payments; above 30 000 → 6 payments; 1000 deposit from 10 000 up (with the default
/// policy). The installment amount is the plain quotient, so `amount × n` can differ from
/// the total by floating point drift; the last installment is not adjusted.
///
/// # Errors
/// `Error::InvalidAmount` when the total is zero, negative or not finite.
pub fn derive_plan(
    total_amount: f64,
    departure_date: NaiveDate,
    today: NaiveDate,
    policy: &PaymentPolicy,
) -> Result<PaymentStructureOptions> {
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_amount,
        });
    }

    let number_of_payments = policy.number_of_payments(total_amount);
    let installment_amount = total_amount / f64::from(number_of_payments);

    let due_dates = (0..number_of_payments)
        .map(|i| {
            today
                .checked_add_months(Months::new(i))
                .ok_or_else(|| Error::Validation {
                    message: format!("installment {} falls outside the calendar", i + 1),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let deposit_amount = policy.deposit_for(total_amount);
    let balance_due_date = departure_date
        .checked_sub_days(Days::new(policy.balance_lead_days))
        .ok_or_else(|| Error::Validation {
            message: format!("balance due date before {departure_date} is out of range"),
        })?;

    Ok(PaymentStructureOptions {
        total_amount,
        installments: InstallmentPlan {
            number_of_payments,
            interest_rate: 0.0,
            installment_amount,
            due_dates,
        },
        deposit: DepositPlan {
            deposit_amount,
            balance_amount: (total_amount - deposit_amount).max(0.0),
            balance_due_date,
        },
    })
}

/// Turns the chosen option into `(amount, due_date)` pairs in payment order.
///
/// A deposit plan whose balance date has already passed gets the balance due today.
#[must_use]
pub fn schedule_for(
    options: &PaymentStructureOptions,
    choice: PlanChoice,
    today: NaiveDate,
) -> Vec<(f64, NaiveDate)> {
    match choice {
        PlanChoice::Installments => options
            .installments
            .due_dates
            .iter()
            .map(|due| (options.installments.installment_amount, *due))
            .collect(),
        PlanChoice::Deposit => {
            let mut schedule = vec![(options.deposit.deposit_amount.min(options.total_amount), today)];
            if options.deposit.balance_amount > 0.0 {
                schedule.push((
                    options.deposit.balance_amount,
                    options.deposit.balance_due_date.max(today),
                ));
            }
            schedule
        }
    }
}

/// Derives a plan for the booking's outstanding amount and stores it as installments.
///
/// Refuses cancelled or completed bookings, fully paid bookings, and bookings that
/// already have a plan.
pub async fn create_installment_plan(
    db: &DatabaseConnection,
    booking_id: i64,
    choice: PlanChoice,
    policy: &PaymentPolicy,
    today: NaiveDate,
) -> Result<Vec<installment::Model>> {
    let txn = db.begin().await?;

    let booking = booking::find_booking(&txn, booking_id).await?;
    if matches!(
        booking.status,
        BookingStatus::Cancelled | BookingStatus::Completed
    ) {
        return Err(Error::Validation {
            message: format!(
                "booking {} is {} and cannot take a payment plan",
                booking.booking_number, booking.status
            ),
        });
    }

    booking::ensure_no_plan(&txn, &booking).await?;

    let outstanding = payment::outstanding(&booking);
    let options = derive_plan(outstanding, booking.travel_start, today, policy)?;

    let mut created = Vec::new();
    for (index, (amount, due_date)) in schedule_for(&options, choice, today).into_iter().enumerate() {
        let installment_number = i32::try_from(index + 1)?;
        let status = payment::derive_status_for_due_date(due_date, today, policy.pending_window_days);
        let model = installment::ActiveModel {
            booking_id: Set(booking_id),
            installment_number: Set(installment_number),
            amount: Set(amount),
            due_date: Set(due_date),
            status: Set(status),
            paid_date: Set(None),
            method: Set(None),
            ..Default::default()
        };
        created.push(model.insert(&txn).await?);
    }

    txn.commit().await?;

    info!(
        booking = %booking.booking_number,
        ?choice,
        payments = created.len(),
        outstanding,
        "Created payment plan"
    );

    Ok(created)
}

/// Retrieves a booking's installments in payment order.
pub async fn get_installments_for_booking(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<Vec<installment::Model>> {
    Installment::find()
        .filter(installment::Column::BookingId.eq(booking_id))
        .order_by_asc(installment::Column::InstallmentNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks an installment paid and records its amount against the booking, atomically.
///
/// Returns the updated installment and booking.
pub async fn pay_installment(
    db: &DatabaseConnection,
    installment_id: i64,
    method: PaymentMethod,
    paid_on: NaiveDate,
) -> Result<(installment::Model, booking_entity::Model)> {
    let txn = db.begin().await?;

    let existing = Installment::find_by_id(installment_id)
        .one(&txn)
        .await?
        .ok_or(Error::InstallmentNotFound { id: installment_id })?;

    if existing.status == InstallmentStatus::Paid {
        return Err(Error::AlreadyPaid { id: installment_id });
    }

    let booking_id = existing.booking_id;
    let amount = existing.amount;

    let mut active_model: installment::ActiveModel = existing.into();
    active_model.status = Set(InstallmentStatus::Paid);
    active_model.paid_date = Set(Some(paid_on));
    active_model.method = Set(Some(method));
    let updated = active_model.update(&txn).await?;

    let booking = booking::apply_payment(&txn, booking_id, amount).await?;

    txn.commit().await?;

    info!(
        booking = %booking.booking_number,
        installment = updated.installment_number,
        amount,
        method = %method,
        "Installment paid"
    );

    Ok((updated, booking))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::coupon;
    use crate::entities::sea_orm_active_enums::{CouponType, PaymentStatus};
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn pay_all(
        db: &DatabaseConnection,
        rows: &[installment::Model],
        today: NaiveDate,
    ) -> Result<booking_entity::Model> {
        let mut last = None;
        for row in rows {
            last = Some(pay_installment(db, row.id, PaymentMethod::Card, today).await?.1);
        }
        Ok(last.unwrap())
    }

    #[test]
    fn test_small_totals_get_three_payments_and_small_deposit() {
        let policy = PaymentPolicy::default();
        for total in [1.0, 499.99, 5_000.0, 9_999.99] {
            let plan = derive_plan(total, date(2024, 6, 10), date(2024, 1, 1), &policy).unwrap();
            assert_eq!(plan.installments.number_of_payments, 3);
            assert_eq!(plan.deposit.deposit_amount, 500.0);
        }
    }

    #[test]
    fn test_mid_totals_get_four_payments() {
        let policy = PaymentPolicy::default();
        for total in [10_000.0, 18_250.5, 30_000.0] {
            let plan = derive_plan(total, date(2024, 6, 10), date(2024, 1, 1), &policy).unwrap();
            assert_eq!(plan.installments.number_of_payments, 4);
            assert_eq!(plan.deposit.deposit_amount, 1000.0);
        }
    }

    #[test]
    fn test_large_totals_get_six_payments() {
        let policy = PaymentPolicy::default();
        for total in [30_000.01, 75_000.0] {
            let plan = derive_plan(total, date(2024, 6, 10), date(2024, 1, 1), &policy).unwrap();
            assert_eq!(plan.installments.number_of_payments, 6);
            assert_eq!(plan.installments.interest_rate, 0.0);
        }
    }

    #[test]
    fn test_installments_sum_to_total_within_tolerance() {
        let policy = PaymentPolicy::default();
        for total in [1_000.0, 9_999.99, 10_001.0, 33_333.33] {
            let plan = derive_plan(total, date(2024, 6, 10), date(2024, 1, 1), &policy).unwrap();
            let sum = plan.installments.installment_amount
                * f64::from(plan.installments.number_of_payments);
            assert!((sum - total).abs() < 1e-6, "{sum} vs {total}");
        }
    }

    #[test]
    fn test_reference_scenario() {
        let plan = derive_plan(
            24_800.0,
            date(2024, 6, 10),
            date(2024, 1, 15),
            &PaymentPolicy::default(),
        )
        .unwrap();

        assert_eq!(plan.installments.number_of_payments, 4);
        assert_eq!(plan.installments.installment_amount, 6200.0);
        assert_eq!(plan.deposit.deposit_amount, 1000.0);
        assert_eq!(plan.deposit.balance_amount, 23_800.0);
        assert_eq!(plan.deposit.balance_due_date, date(2024, 4, 11));
    }

    #[test]
    fn test_balance_due_is_sixty_days_before_departure() {
        let policy = PaymentPolicy::default();
        for departure in [date(2024, 3, 1), date(2025, 1, 15), date(2024, 12, 31)] {
            let plan = derive_plan(5_000.0, departure, date(2024, 1, 1), &policy).unwrap();
            assert_eq!(
                departure.signed_duration_since(plan.deposit.balance_due_date).num_days(),
                60
            );
        }
    }

    #[test]
    fn test_due_dates_are_monthly_from_today() {
        let plan = derive_plan(
            12_000.0,
            date(2025, 1, 1),
            date(2024, 1, 31),
            &PaymentPolicy::default(),
        )
        .unwrap();

        // Month-end dates clamp to the last day of shorter months
        assert_eq!(
            plan.installments.due_dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 29),
                date(2024, 3, 31),
                date(2024, 4, 30)
            ]
        );
    }

    #[test]
    fn test_invalid_totals_are_rejected() {
        let policy = PaymentPolicy::default();
        for total in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let result = derive_plan(total, date(2024, 6, 10), date(2024, 1, 1), &policy);
            assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        }
    }

    #[test]
    fn test_custom_policy_thresholds() {
        let policy = PaymentPolicy {
            small_booking_limit: 2_000.0,
            large_booking_limit: 4_000.0,
            small_deposit: 100.0,
            standard_deposit: 250.0,
            balance_lead_days: 30,
            pending_window_days: 14,
        };
        let plan = derive_plan(3_000.0, date(2024, 6, 10), date(2024, 1, 1), &policy).unwrap();
        assert_eq!(plan.installments.number_of_payments, 4);
        assert_eq!(plan.deposit.deposit_amount, 250.0);
        assert_eq!(plan.deposit.balance_due_date, date(2024, 5, 11));
    }

    #[test]
    fn test_deposit_schedule_moves_past_balance_date_to_today() {
        let today = date(2024, 5, 1);
        let options =
            derive_plan(8_000.0, date(2024, 6, 10), today, &PaymentPolicy::default()).unwrap();
        let schedule = schedule_for(&options, PlanChoice::Deposit, today);

        assert_eq!(schedule, vec![(500.0, today), (7_500.0, today)]);
    }

    #[tokio::test]
    async fn test_create_installment_plan_persists_rows() -> Result<()> {
        let (db, booking) = setup_with_booking(24_800.0).await?;
        let today = date(2024, 1, 15);

        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;

        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows.iter().map(|r| r.installment_number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(rows.iter().all(|r| r.amount == 6200.0));
        assert_eq!(rows[0].status, InstallmentStatus::Pending);
        assert_eq!(rows[3].status, InstallmentStatus::Upcoming);

        let loaded = get_installments_for_booking(&db, booking.id).await?;
        assert_eq!(loaded, rows);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_installment_plan_twice_is_rejected() -> Result<()> {
        let (db, booking) = setup_with_booking(5_000.0).await?;
        let today = date(2024, 1, 15);
        let policy = PaymentPolicy::default();

        create_installment_plan(&db, booking.id, PlanChoice::Deposit, &policy, today).await?;
        let second =
            create_installment_plan(&db, booking.id, PlanChoice::Installments, &policy, today)
                .await;

        assert!(matches!(second, Err(Error::PlanExists { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_installment_updates_booking() -> Result<()> {
        let (db, booking) = setup_with_booking(9_000.0).await?;
        let today = date(2024, 1, 15);
        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;

        let (paid, updated_booking) =
            pay_installment(&db, rows[0].id, PaymentMethod::BankTransfer, today).await?;
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_date, Some(today));
        assert_eq!(paid.method, Some(PaymentMethod::BankTransfer));
        assert_eq!(updated_booking.paid_amount, 3_000.0);
        assert_eq!(updated_booking.payment_status, PaymentStatus::Partial);

        let again = pay_installment(&db, rows[0].id, PaymentMethod::Cash, today).await;
        assert!(matches!(again, Err(Error::AlreadyPaid { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_paying_every_installment_settles_booking() -> Result<()> {
        // 10 000 / 3 does not divide evenly; the final payment must still be accepted
        let (db, booking) = setup_with_booking(9_999.99).await?;
        let today = date(2024, 1, 15);
        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;

        let mut last = None;
        for row in &rows {
            last = Some(pay_installment(&db, row.id, PaymentMethod::Card, today).await?.1);
        }

        let settled = last.unwrap();
        assert_eq!(settled.payment_status, PaymentStatus::Paid);
        assert_eq!(settled.paid_amount, settled.total_amount);

        Ok(())
    }

    #[tokio::test]
    async fn test_pay_missing_installment() -> Result<()> {
        let db = setup_test_db().await?;
        let result = pay_installment(&db, 404, PaymentMethod::Cash, date(2024, 1, 1)).await;
        assert!(matches!(result, Err(Error::InstallmentNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_after_plan_is_rejected() -> Result<()> {
        let (db, booking) = setup_with_booking(9_000.0).await?;
        create_test_coupon(&db, "SPRING10", CouponType::Percentage, 10.0).await?;
        let today = date(2024, 1, 15);
        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;

        let late = booking::apply_coupon(&db, booking.id, "SPRING10", today).await;
        assert!(matches!(late, Err(Error::PlanExists { .. })));
        let stored = coupon::get_coupon_by_code(&db, "SPRING10").await?.unwrap();
        assert_eq!(stored.used_count, 0);

        // The plan still settles the untouched total
        let settled = pay_all(&db, &rows, today).await?;
        assert_eq!(settled.total_amount, 9_000.0);
        assert_eq!(settled.paid_amount, 9_000.0);
        assert_eq!(settled.payment_status, PaymentStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_coupon_before_plan_shrinks_installments() -> Result<()> {
        let (db, booking) = setup_with_booking(9_000.0).await?;
        create_test_coupon(&db, "SPRING10", CouponType::Percentage, 10.0).await?;
        let today = date(2024, 1, 15);

        booking::apply_coupon(&db, booking.id, "SPRING10", today).await?;
        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.amount == 2_700.0));

        let settled = pay_all(&db, &rows, today).await?;
        assert_eq!(settled.paid_amount, 8_100.0);
        assert_eq!(settled.payment_status, PaymentStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_ad_hoc_payment_after_plan_is_rejected() -> Result<()> {
        let (db, booking) = setup_with_booking(9_000.0).await?;
        let today = date(2024, 1, 15);
        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;

        let ad_hoc = booking::record_payment(&db, booking.id, 3_000.0).await;
        assert!(matches!(ad_hoc, Err(Error::PlanExists { .. })));
        let unchanged = booking::get_booking_by_id(&db, booking.id).await?.unwrap();
        assert_eq!(unchanged.paid_amount, 0.0);

        let settled = pay_all(&db, &rows, today).await?;
        assert_eq!(settled.paid_amount, 9_000.0);
        assert_eq!(settled.payment_status, PaymentStatus::Paid);

        Ok(())
    }

    #[tokio::test]
    async fn test_ad_hoc_payment_before_plan_is_left_out_of_it() -> Result<()> {
        let (db, booking) = setup_with_booking(9_000.0).await?;
        let today = date(2024, 1, 15);

        booking::record_payment(&db, booking.id, 3_000.0).await?;
        let rows = create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.amount == 2_000.0));

        let settled = pay_all(&db, &rows, today).await?;
        assert_eq!(settled.paid_amount, 9_000.0);
        assert_eq!(settled.payment_status, PaymentStatus::Paid);

        Ok(())
    }
}
