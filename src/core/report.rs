//! Booking analytics and display formatting.
//!
//! This module aggregates bookings into dashboard figures and provides the text
//! helpers the bot layer uses for amounts, progress bars and installment lines.
//! All functions are framework-agnostic and return structured data or plain strings.

use crate::{
    core::{booking, package, payment},
    entities::{
        booking as booking_entity, installment, package as package_entity,
        sea_orm_active_enums::{BookingStatus, Continent, InstallmentStatus, PaymentStatus},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, fmt::Write};

/// Dashboard figures over a set of bookings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingSummary {
    /// Bookings considered
    pub total_bookings: usize,
    /// Count per booking status
    pub by_status: HashMap<BookingStatus, usize>,
    /// Count per payment status
    pub by_payment_status: HashMap<PaymentStatus, usize>,
    /// Count per package continent, for bookings whose package is known
    pub by_continent: HashMap<Continent, usize>,
    /// Sum of totals of bookings that are not cancelled
    pub booked_value: f64,
    /// Money received and not refunded
    pub collected: f64,
    /// Money still owed on bookings that are not cancelled
    pub outstanding: f64,
}

impl BookingSummary {
    /// Bookings with the given status
    #[must_use]
    pub fn count_status(&self, status: BookingStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Bookings with the given payment status
    #[must_use]
    pub fn count_payment_status(&self, status: PaymentStatus) -> usize {
        self.by_payment_status.get(&status).copied().unwrap_or(0)
    }

    /// Collected share of the booked value, or 0 when nothing is booked.
    #[must_use]
    pub fn collection_percent(&self) -> f64 {
        payment::progress_percent(self.collected, self.booked_value).unwrap_or(0.0)
    }
}

/// Aggregates bookings into dashboard figures.
///
/// `packages` resolves each booking's continent; bookings whose package is missing
/// are still counted everywhere else.
#[must_use]
pub fn summarize_bookings(
    bookings: &[booking_entity::Model],
    packages: &[package_entity::Model],
) -> BookingSummary {
    let continents: HashMap<i64, Continent> = packages
        .iter()
        .map(|pkg| (pkg.id, pkg.continent))
        .collect();

    let mut summary = BookingSummary {
        total_bookings: bookings.len(),
        ..BookingSummary::default()
    };

    for b in bookings {
        *summary.by_status.entry(b.status).or_default() += 1;
        *summary.by_payment_status.entry(b.payment_status).or_default() += 1;
        if let Some(continent) = continents.get(&b.package_id) {
            *summary.by_continent.entry(*continent).or_default() += 1;
        }

        if b.payment_status != PaymentStatus::Refunded {
            summary.collected += b.paid_amount;
        }
        if b.status != BookingStatus::Cancelled {
            summary.booked_value += b.total_amount;
            summary.outstanding += payment::outstanding(b);
        }
    }

    summary
}

/// Loads every booking and package and summarizes them.
pub async fn generate_booking_summary(db: &DatabaseConnection) -> Result<BookingSummary> {
    let bookings = booking::list_bookings(db, None).await?;
    let packages = package::list_all_packages(db).await?;
    Ok(summarize_bookings(&bookings, &packages))
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80%`
///
/// # Arguments
/// * `progress_percent` - Progress percentage (0-100)
/// * `bar_length` - Length of the progress bar in characters (default 10)
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // Cast safety: clamped_progress ∈ [0, 100], length is small (10-20).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.0}%")
}

/// Formats an amount with thousands separators, e.g. `USD 24,800.00`.
#[must_use]
pub fn format_amount(amount: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{currency} {sign}{grouped}.{cents}")
}

/// One line describing an installment, e.g. `#2 | USD 6,200.00 | due 2024-05-01 | pending`.
#[must_use]
pub fn format_installment_line(
    installment: &installment::Model,
    status: InstallmentStatus,
    currency: &str,
) -> String {
    let amount = format_amount(installment.amount, currency);
    let mut line = format!(
        "#{} | {amount} | due {} | {status}",
        installment.installment_number, installment.due_date
    );
    if let Some(paid_on) = installment.paid_date {
        let _ = write!(line, " on {paid_on}");
    }
    line
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_format_progress_bar_full() {
        let bar = format_progress_bar(100.0, Some(10));
        assert_eq!(bar, "[██████████] 100%");
    }

    #[test]
    fn test_format_progress_bar_half() {
        let bar = format_progress_bar(50.0, Some(10));
        assert_eq!(bar, "[█████░░░░░] 50%");
    }

    #[test]
    fn test_format_progress_bar_zero() {
        let bar = format_progress_bar(0.0, Some(10));
        assert_eq!(bar, "[░░░░░░░░░░] 0%");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(24_800.0, "USD"), "USD 24,800.00");
        assert_eq!(format_amount(6_200.5, "EUR"), "EUR 6,200.50");
        assert_eq!(format_amount(999.999, "USD"), "USD 1,000.00");
        assert_eq!(format_amount(1_234_567.0, "IDR"), "IDR 1,234,567.00");
        assert_eq!(format_amount(0.0, "USD"), "USD 0.00");
        assert_eq!(format_amount(-50.0, "USD"), "USD -50.00");
    }

    #[test]
    fn test_format_installment_line() {
        let inst = installment::Model {
            id: 1,
            booking_id: 1,
            installment_number: 2,
            amount: 6_200.0,
            due_date: date(2024, 5, 1),
            status: InstallmentStatus::Paid,
            paid_date: Some(date(2024, 4, 28)),
            method: None,
        };
        assert_eq!(
            format_installment_line(&inst, InstallmentStatus::Paid, "USD"),
            "#2 | USD 6,200.00 | due 2024-05-01 | paid on 2024-04-28"
        );
    }

    #[tokio::test]
    async fn test_generate_booking_summary() -> Result<()> {
        let (db, first) = setup_with_booking(10_000.0).await?;
        let second = booking::create_booking(&db, test_new_booking(first.package_id)).await?;
        let third = booking::create_booking(&db, test_new_booking(first.package_id)).await?;

        booking::record_payment(&db, first.id, 4_000.0).await?;
        booking::update_booking_status(&db, first.id, BookingStatus::Confirmed).await?;
        booking::record_payment(&db, third.id, 500.0).await?;
        booking::refund_booking(&db, third.id).await?;

        let summary = generate_booking_summary(&db).await?;
        let second_total = second.total_amount;

        assert_eq!(summary.total_bookings, 3);
        assert_eq!(summary.count_status(BookingStatus::Confirmed), 1);
        assert_eq!(summary.count_status(BookingStatus::Inquiry), 1);
        assert_eq!(summary.count_status(BookingStatus::Cancelled), 1);
        assert_eq!(summary.count_payment_status(PaymentStatus::Refunded), 1);
        assert_eq!(summary.by_continent.get(&Continent::Europe), Some(&3));
        assert_eq!(summary.booked_value, 10_000.0 + second_total);
        assert_eq!(summary.collected, 4_000.0);
        assert_eq!(summary.outstanding, 6_000.0 + second_total);

        Ok(())
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize_bookings(&[], &[]);
        assert_eq!(summary.total_bookings, 0);
        assert_eq!(summary.collection_percent(), 0.0);
    }
}
