//! Closed enums shared by several tables.
//!
//! Each enum is stored as its lowercase string value, so the database stays readable
//! and new variants never renumber existing rows.

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::Error;

/// Lifecycle of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Customer asked about a package, nothing committed yet
    #[sea_orm(string_value = "inquiry")]
    Inquiry,
    /// Reservation accepted
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Tour has taken place
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Reservation withdrawn
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inquiry => "inquiry",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Completed and cancelled bookings are terminal.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Inquiry, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled)
        )
    }
}

/// Settlement state of a booking's payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid yet
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Some but not all of the total paid
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Fully paid
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Money returned to the customer
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

impl PaymentStatus {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    /// Status implied by how much of the total has been collected.
    #[must_use]
    pub fn from_amounts(paid: f64, total: f64) -> Self {
        if paid <= 0.0 {
            Self::Pending
        } else if paid < total {
            Self::Partial
        } else {
            Self::Paid
        }
    }
}

/// Status of one installment. Only `Paid` is authoritative when read from the
/// database; the rest are recomputed from the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum InstallmentStatus {
    /// Due soon
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Past its due date and unpaid
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Due later than the pending window
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
}

impl InstallmentStatus {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Upcoming => "upcoming",
        }
    }
}

/// How an installment was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Credit or debit card
    #[sea_orm(string_value = "card")]
    Card,
    /// Cash at the office
    #[sea_orm(string_value = "cash")]
    Cash,
    /// E-wallet
    #[sea_orm(string_value = "e_wallet")]
    EWallet,
}

impl PaymentMethod {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BankTransfer => "bank_transfer",
            Self::Card => "card",
            Self::Cash => "cash",
            Self::EWallet => "e_wallet",
        }
    }
}

/// Status of a tour guide assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Tour has not started
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    /// Tour is running
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Tour finished
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Assignment withdrawn; never counts as a conflict
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl AssignmentStatus {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an assignment may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Upcoming, Self::InProgress | Self::Cancelled)
                | (Self::InProgress, Self::Completed | Self::Cancelled)
        )
    }
}

/// Kind of discount a coupon grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum CouponType {
    /// `value` percent off
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// `value` off, capped at the amount
    #[sea_orm(string_value = "fixed")]
    Fixed,
    /// Buy one get one: every second participant travels free
    #[sea_orm(string_value = "bogo")]
    Bogo,
    /// Carried over from the shop catalog; worth nothing on a tour package
    #[sea_orm(string_value = "free_shipping")]
    FreeShipping,
}

impl CouponType {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
            Self::Bogo => "bogo",
            Self::FreeShipping => "free_shipping",
        }
    }
}

/// Customer classification used for display and coupon eligibility.
///
/// Variants are declared in ascending order so `Ord` ranks them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum CustomerTier {
    /// Regular customer
    #[sea_orm(string_value = "normal")]
    Normal,
    /// Frequent customer
    #[sea_orm(string_value = "vip")]
    Vip,
    /// Top customer
    #[sea_orm(string_value = "vvip")]
    Vvip,
}

impl CustomerTier {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Vip => "vip",
            Self::Vvip => "vvip",
        }
    }
}

/// Continent a package travels to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Continent {
    /// Africa
    #[sea_orm(string_value = "africa")]
    Africa,
    /// Asia
    #[sea_orm(string_value = "asia")]
    Asia,
    /// Europe
    #[sea_orm(string_value = "europe")]
    Europe,
    /// North America
    #[sea_orm(string_value = "north_america")]
    NorthAmerica,
    /// South America
    #[sea_orm(string_value = "south_america")]
    SouthAmerica,
    /// Oceania
    #[sea_orm(string_value = "oceania")]
    Oceania,
    /// Antarctica
    #[sea_orm(string_value = "antarctica")]
    Antarctica,
}

impl Continent {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Africa => "africa",
            Self::Asia => "asia",
            Self::Europe => "europe",
            Self::NorthAmerica => "north_america",
            Self::SouthAmerica => "south_america",
            Self::Oceania => "oceania",
            Self::Antarctica => "antarctica",
        }
    }
}

/// Staff and customer roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full access including user administration
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    /// Agency administrator
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Reservation desk
    #[sea_orm(string_value = "booking_reservation")]
    BookingReservation,
    /// Tour guide
    #[sea_orm(string_value = "tour_guide")]
    TourGuide,
    /// External travel agent
    #[sea_orm(string_value = "travel_agent")]
    TravelAgent,
    /// Finance team
    #[sea_orm(string_value = "finance")]
    Finance,
    /// Sales and marketing
    #[sea_orm(string_value = "sales_marketing")]
    SalesMarketing,
    /// End customer
    #[sea_orm(string_value = "customer")]
    Customer,
}

impl Role {
    /// Lowercase value as stored and displayed
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::BookingReservation => "booking_reservation",
            Self::TourGuide => "tour_guide",
            Self::TravelAgent => "travel_agent",
            Self::Finance => "finance",
            Self::SalesMarketing => "sales_marketing",
            Self::Customer => "customer",
        }
    }
}

/// Parses any of the enums above from its stored string value,
/// ignoring case and surrounding whitespace.
fn parse_variant<T: ActiveEnum<Value = String> + Iterable>(kind: &str, input: &str) -> Result<T, Error> {
    let wanted = input.trim().to_lowercase();
    T::iter().find(|variant| variant.to_value() == wanted).ok_or_else(|| Error::Validation {
        message: format!("unknown {kind} '{input}'"),
    })
}

macro_rules! impl_display_and_parse {
    ($($ty:ident => $kind:literal),* $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $ty {
                type Err = Error;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    parse_variant($kind, s)
                }
            }
        )*
    };
}

impl_display_and_parse!(
    BookingStatus => "booking status",
    PaymentStatus => "payment status",
    InstallmentStatus => "installment status",
    PaymentMethod => "payment method",
    AssignmentStatus => "assignment status",
    CouponType => "coupon type",
    CustomerTier => "customer tier",
    Continent => "continent",
    Role => "role",
);

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_booking_lifecycle_transitions() {
        assert!(BookingStatus::Inquiry.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Inquiry.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Inquiry.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
    }

    #[test]
    fn test_assignment_transitions() {
        assert!(AssignmentStatus::Upcoming.can_transition_to(AssignmentStatus::InProgress));
        assert!(AssignmentStatus::InProgress.can_transition_to(AssignmentStatus::Completed));
        assert!(!AssignmentStatus::Upcoming.can_transition_to(AssignmentStatus::Completed));
        assert!(!AssignmentStatus::Cancelled.can_transition_to(AssignmentStatus::Upcoming));
    }

    #[test]
    fn test_payment_status_from_amounts() {
        assert_eq!(PaymentStatus::from_amounts(0.0, 100.0), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::from_amounts(40.0, 100.0), PaymentStatus::Partial);
        assert_eq!(PaymentStatus::from_amounts(100.0, 100.0), PaymentStatus::Paid);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("  VIP ".parse::<CustomerTier>().unwrap(), CustomerTier::Vip);
        assert_eq!("north_america".parse::<Continent>().unwrap(), Continent::NorthAmerica);
        assert_eq!("Finance".parse::<Role>().unwrap(), Role::Finance);
        assert!("pirate".parse::<Role>().is_err());
    }

    #[test]
    fn test_tier_ordering() {
        assert!(CustomerTier::Normal < CustomerTier::Vip);
        assert!(CustomerTier::Vip < CustomerTier::Vvip);
    }

    #[test]
    fn test_display_matches_stored_value() {
        for role in Role::iter() {
            assert_eq!(role.to_string(), role.to_value());
        }
        for status in InstallmentStatus::iter() {
            assert_eq!(status.to_string(), status.to_value());
        }
    }
}
