//! Unified error type for the travel desk.
//!
//! Every fallible operation in `core`, `config` and `bot` returns [`Result`], so errors
//! propagate with `?` from the database layer all the way up to the Discord reply.

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::coupon::CouponRejection;

/// All errors the travel desk can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read, parsed, or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Environment variable missing or unreadable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A monetary amount that is zero, negative, or not finite where that is not allowed
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The offending amount
        amount: f64,
    },

    /// A date range whose start is after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Range start
        start: NaiveDate,
        /// Range end
        end: NaiveDate,
    },

    /// Input failed validation for a reason other than amount or dates
    #[error("Invalid input: {message}")]
    Validation {
        /// Why the input was rejected
        message: String,
    },

    /// No booking matches the given id or booking number
    #[error("Booking not found: {reference}")]
    BookingNotFound {
        /// Booking id or booking number
        reference: String,
    },

    /// No package matches the given id or name
    #[error("Package not found: {reference}")]
    PackageNotFound {
        /// Package id or name
        reference: String,
    },

    /// No installment with that id
    #[error("Installment not found: {id}")]
    InstallmentNotFound {
        /// Installment id
        id: i64,
    },

    /// No tour guide matches the given id or name
    #[error("Tour guide not found: {reference}")]
    GuideNotFound {
        /// Guide id or name
        reference: String,
    },

    /// No guide assignment with that id
    #[error("Assignment not found: {id}")]
    AssignmentNotFound {
        /// Assignment id
        id: i64,
    },

    /// No coupon with that code
    #[error("Coupon not found: {code}")]
    CouponNotFound {
        /// Coupon code as entered
        code: String,
    },

    /// No staff user registered for that Discord id
    #[error("User not found: {discord_id}")]
    UserNotFound {
        /// Discord user id
        discord_id: String,
    },

    /// A status change that the lifecycle does not allow
    #[error("Cannot move {entity} from {from} to {to}")]
    InvalidTransition {
        /// Entity kind, e.g. "booking"
        entity: &'static str,
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    /// A payment that would push the paid amount above the booking total
    #[error("Overpayment: paid {paid:.2} + {amount:.2} exceeds total {total:.2}")]
    Overpayment {
        /// Amount already paid
        paid: f64,
        /// Amount being recorded
        amount: f64,
        /// Booking total
        total: f64,
    },

    /// The installment has already been settled
    #[error("Installment {id} is already paid")]
    AlreadyPaid {
        /// Installment id
        id: i64,
    },

    /// The booking already carries an installment plan
    #[error("Booking {booking_number} already has an installment plan")]
    PlanExists {
        /// Booking number
        booking_number: String,
    },

    /// The coupon exists but cannot be applied
    #[error("Coupon {code} rejected: {reason}")]
    CouponRejected {
        /// Coupon code
        code: String,
        /// Why it was rejected
        reason: CouponRejection,
    },

    /// A unique name or code is already taken
    #[error("{entity} already exists: {name}")]
    Duplicate {
        /// Entity kind
        entity: &'static str,
        /// Conflicting name or code
        name: String,
    },

    /// The caller's role does not grant access
    #[error("Role {role} has no access to {resource}")]
    PermissionDenied {
        /// Caller role
        role: String,
        /// Menu item or permission that was required
        resource: String,
    },

    /// Integer conversion overflow
    #[error("Numeric conversion error: {0}")]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// Writing a reply into a `String` failed
    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
