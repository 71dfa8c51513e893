//! Discord command implementations organized by menu section.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Booking lookup, lifecycle, payment and coupon commands
pub mod booking;

/// Coupon management commands
pub mod coupon;

/// Dashboard overview command
pub mod dashboard;

/// General utility commands
pub mod general;

/// Tour guide availability and assignment commands
pub mod guide;

/// Payment plan and installment commands
pub mod plan;

/// Staff account commands
pub mod user;

// Export commands
pub use booking::*;
pub use coupon::*;
pub use dashboard::*;
pub use general::*;
pub use guide::*;
pub use plan::*;
pub use user::*;
