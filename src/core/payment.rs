//! Payment views derived at read time from a booking and its installments.
//!
//! The stored installment status is a cache. Apart from `paid`, which is set when money
//! arrives, status is always recomputed from the due date. `reconcile_installment_statuses`
//! rewrites the cache once a day so that plain database reads stay close to the truth.

use crate::{
    entities::{
        Installment, SystemState, booking, installment,
        sea_orm_active_enums::InstallmentStatus, system_state,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

const LAST_RECONCILIATION_KEY: &str = "last_status_reconciliation";
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Amount still owed on a booking.
#[must_use]
pub fn outstanding(booking: &booking::Model) -> f64 {
    booking.total_amount - booking.paid_amount
}

/// Share of the total already paid, rounded to a whole percent.
///
/// # Errors
/// `Error::InvalidAmount` when the total is zero, negative or not finite.
pub fn progress_percent(paid_amount: f64, total_amount: f64) -> Result<f64> {
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: total_amount,
        });
    }

    Ok((paid_amount / total_amount * 100.0).round())
}

/// Status of an unpaid installment due on `due_date`, as seen on `today`.
#[must_use]
pub fn derive_status_for_due_date(
    due_date: NaiveDate,
    today: NaiveDate,
    pending_window_days: i64,
) -> InstallmentStatus {
    let days_ahead = due_date.signed_duration_since(today).num_days();
    if days_ahead < 0 {
        InstallmentStatus::Overdue
    } else if days_ahead <= pending_window_days {
        InstallmentStatus::Pending
    } else {
        InstallmentStatus::Upcoming
    }
}

/// Authoritative status of an installment: paid stays paid, everything else follows
/// the due date regardless of what is stored.
#[must_use]
pub fn derive_installment_status(
    installment: &installment::Model,
    today: NaiveDate,
    pending_window_days: i64,
) -> InstallmentStatus {
    if installment.status == InstallmentStatus::Paid {
        InstallmentStatus::Paid
    } else {
        derive_status_for_due_date(installment.due_date, today, pending_window_days)
    }
}

/// Earliest installment that is still pending or upcoming. Overdue ones are not
/// "next due"; they are reported separately.
#[must_use]
pub fn next_due(
    installments: &[installment::Model],
    today: NaiveDate,
    pending_window_days: i64,
) -> Option<&installment::Model> {
    installments
        .iter()
        .filter(|inst| {
            matches!(
                derive_installment_status(inst, today, pending_window_days),
                InstallmentStatus::Pending | InstallmentStatus::Upcoming
            )
        })
        .min_by_key(|inst| inst.due_date)
}

/// Whole days from `now` until the start of `due_date` (UTC), rounded up.
/// Negative means overdue.
#[must_use]
pub fn days_until_due(due_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due = due_date.and_time(NaiveTime::MIN).and_utc();
    let millis = due.signed_duration_since(now).num_milliseconds();

    // Integer division truncates toward zero, which is already the ceiling for negatives
    let days = millis / MILLIS_PER_DAY;
    if millis > 0 && millis % MILLIS_PER_DAY != 0 {
        days + 1
    } else {
        days
    }
}

/// Read-time summary of a booking's payments.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSummary {
    /// `total - paid`
    pub outstanding: f64,
    /// Rounded paid percentage
    pub progress_percent: f64,
    /// Next pending or upcoming installment
    pub next_due: Option<installment::Model>,
    /// Days until `next_due` falls due
    pub days_until_due: Option<i64>,
    /// Unpaid installments past their due date
    pub overdue: Vec<installment::Model>,
}

/// Builds the payment summary for a booking.
///
/// # Errors
/// `Error::InvalidAmount` when the booking total is not positive.
pub fn payment_summary(
    booking: &booking::Model,
    installments: &[installment::Model],
    now: DateTime<Utc>,
    pending_window_days: i64,
) -> Result<PaymentSummary> {
    let today = now.date_naive();
    let next = next_due(installments, today, pending_window_days).cloned();
    let overdue = installments
        .iter()
        .filter(|inst| {
            derive_installment_status(inst, today, pending_window_days)
                == InstallmentStatus::Overdue
        })
        .cloned()
        .collect();

    Ok(PaymentSummary {
        outstanding: outstanding(booking),
        progress_percent: progress_percent(booking.paid_amount, booking.total_amount)?,
        days_until_due: next.as_ref().map(|inst| days_until_due(inst.due_date, now)),
        next_due: next,
        overdue,
    })
}

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Installments looked at
    pub examined: usize,
    /// Installments whose cached status changed
    pub updated: usize,
    /// Of those, how many became overdue
    pub newly_overdue: usize,
    /// Day the run represents
    pub run_date: NaiveDate,
}

/// Retrieves the day the cache was last reconciled, if ever.
pub async fn get_last_reconciliation_date(db: &DatabaseConnection) -> Result<Option<NaiveDate>> {
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_RECONCILIATION_KEY))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("Failed to parse last reconciliation date: {e}"),
            }),
        None => Ok(None),
    }
}

async fn set_last_reconciliation_date<C>(db: &C, date: NaiveDate) -> Result<()>
where
    C: ConnectionTrait,
{
    let date_str = date.format("%Y-%m-%d").to_string();
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(LAST_RECONCILIATION_KEY))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(date_str);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        system_state::ActiveModel {
            key: Set(LAST_RECONCILIATION_KEY.to_string()),
            value: Set(date_str),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Rewrites every unpaid installment's cached status to its derived value.
///
/// Runs at most once per day; returns `Ok(None)` when `today` was already reconciled.
/// All updates happen in one transaction.
pub async fn reconcile_installment_statuses(
    db: &DatabaseConnection,
    today: NaiveDate,
    pending_window_days: i64,
) -> Result<Option<ReconciliationResult>> {
    if get_last_reconciliation_date(db).await? == Some(today) {
        return Ok(None);
    }

    let txn = db.begin().await?;

    let unpaid = Installment::find()
        .filter(installment::Column::Status.ne(InstallmentStatus::Paid))
        .all(&txn)
        .await?;

    let examined = unpaid.len();
    let mut updated = 0;
    let mut newly_overdue = 0;

    for inst in unpaid {
        let derived = derive_installment_status(&inst, today, pending_window_days);
        if derived == inst.status {
            continue;
        }
        if derived == InstallmentStatus::Overdue {
            newly_overdue += 1;
        }
        let mut active_model: installment::ActiveModel = inst.into();
        active_model.status = Set(derived);
        active_model.update(&txn).await?;
        updated += 1;
    }

    set_last_reconciliation_date(&txn, today).await?;
    txn.commit().await?;

    info!(examined, updated, newly_overdue, "Reconciled installment statuses");

    Ok(Some(ReconciliationResult {
        examined,
        updated,
        newly_overdue,
        run_date: today,
    }))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::installment::{self as plan, PaymentPolicy, PlanChoice};
    use crate::entities::sea_orm_active_enums::PaymentMethod;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn inst(id: i64, due: NaiveDate, status: InstallmentStatus) -> installment::Model {
        installment::Model {
            id,
            booking_id: 1,
            installment_number: i32::try_from(id).unwrap(),
            amount: 100.0,
            due_date: due,
            status,
            paid_date: None,
            method: None,
        }
    }

    #[test]
    fn test_progress_percent_rounds() {
        assert_eq!(progress_percent(0.0, 24_800.0).unwrap(), 0.0);
        assert_eq!(progress_percent(6_200.0, 24_800.0).unwrap(), 25.0);
        assert_eq!(progress_percent(1.0, 3.0).unwrap(), 33.0);
        assert_eq!(progress_percent(2.0, 3.0).unwrap(), 67.0);
    }

    #[test]
    fn test_progress_percent_rejects_zero_total() {
        assert!(matches!(
            progress_percent(10.0, 0.0),
            Err(Error::InvalidAmount { .. })
        ));
        assert!(matches!(
            progress_percent(10.0, -5.0),
            Err(Error::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_stored_overdue_is_recomputed() {
        let today = date(2024, 3, 1);
        // Stored as overdue but the due date is in the future
        let cached = inst(1, date(2024, 3, 20), InstallmentStatus::Overdue);
        assert_eq!(
            derive_installment_status(&cached, today, 30),
            InstallmentStatus::Pending
        );

        let late = inst(2, date(2024, 2, 28), InstallmentStatus::Upcoming);
        assert_eq!(
            derive_installment_status(&late, today, 30),
            InstallmentStatus::Overdue
        );

        let paid = inst(3, date(2024, 1, 1), InstallmentStatus::Paid);
        assert_eq!(
            derive_installment_status(&paid, today, 30),
            InstallmentStatus::Paid
        );
    }

    #[test]
    fn test_pending_window_boundary() {
        let today = date(2024, 3, 1);
        assert_eq!(
            derive_status_for_due_date(today, today, 30),
            InstallmentStatus::Pending
        );
        assert_eq!(
            derive_status_for_due_date(date(2024, 3, 31), today, 30),
            InstallmentStatus::Pending
        );
        assert_eq!(
            derive_status_for_due_date(date(2024, 4, 1), today, 30),
            InstallmentStatus::Upcoming
        );
    }

    #[test]
    fn test_next_due_skips_paid_and_overdue() {
        let today = date(2024, 3, 1);
        let installments = vec![
            inst(1, date(2024, 1, 1), InstallmentStatus::Paid),
            inst(2, date(2024, 2, 1), InstallmentStatus::Pending),
            inst(4, date(2024, 5, 1), InstallmentStatus::Upcoming),
            inst(3, date(2024, 4, 1), InstallmentStatus::Upcoming),
        ];

        let next = next_due(&installments, today, 30).unwrap();
        assert_eq!(next.id, 3);
    }

    #[test]
    fn test_next_due_none_when_everything_settled() {
        let installments = vec![inst(1, date(2024, 1, 1), InstallmentStatus::Paid)];
        assert!(next_due(&installments, date(2024, 3, 1), 30).is_none());
    }

    #[test]
    fn test_days_until_due_rounds_up() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(days_until_due(date(2024, 3, 2), now), 1);
        assert_eq!(days_until_due(date(2024, 3, 11), now), 10);
        // Same day, already past midnight: zero, not overdue yet
        assert_eq!(days_until_due(date(2024, 3, 1), now), 0);
        assert_eq!(days_until_due(date(2024, 2, 28), now), -2);
    }

    #[test]
    fn test_days_until_due_exact_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(days_until_due(date(2024, 3, 4), now), 3);
    }

    #[tokio::test]
    async fn test_payment_summary_for_booking() -> Result<()> {
        let (db, booking) = setup_with_booking(12_000.0).await?;
        let today = date(2024, 1, 15);
        let rows = plan::create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            today,
        )
        .await?;
        let (_, booking) =
            plan::pay_installment(&db, rows[0].id, PaymentMethod::Card, today).await?;
        let rows = plan::get_installments_for_booking(&db, booking.id).await?;

        let now = Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap();
        let summary = payment_summary(&booking, &rows, now, 30)?;

        assert_eq!(summary.outstanding, 9_000.0);
        assert_eq!(summary.progress_percent, 25.0);
        assert_eq!(summary.next_due.as_ref().unwrap().installment_number, 2);
        assert_eq!(summary.days_until_due, Some(26));
        assert!(summary.overdue.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_reconcile_runs_once_per_day() -> Result<()> {
        let (db, booking) = setup_with_booking(12_000.0).await?;
        let plan_day = date(2024, 1, 15);
        plan::create_installment_plan(
            &db,
            booking.id,
            PlanChoice::Installments,
            &PaymentPolicy::default(),
            plan_day,
        )
        .await?;

        // Jan, Feb and Mar are now overdue; Apr falls inside the pending window
        let later = date(2024, 3, 20);
        let result = reconcile_installment_statuses(&db, later, 30)
            .await?
            .unwrap();
        assert_eq!(result.examined, 4);
        assert_eq!(result.newly_overdue, 3);

        let rows = plan::get_installments_for_booking(&db, booking.id).await?;
        let statuses: Vec<_> = rows.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![
                InstallmentStatus::Overdue,
                InstallmentStatus::Overdue,
                InstallmentStatus::Overdue,
                InstallmentStatus::Pending,
            ]
        );

        assert!(reconcile_installment_statuses(&db, later, 30).await?.is_none());
        assert_eq!(get_last_reconciliation_date(&db).await?, Some(later));

        Ok(())
    }
}
