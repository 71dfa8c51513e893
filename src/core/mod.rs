/// Booking creation, lifecycle, payments and coupon application
pub mod booking;
/// Coupon rules, validation and redemption
pub mod coupon;
/// Tour guide roster, assignments and itineraries
pub mod guide;
/// Installment and deposit plan derivation and persistence
pub mod installment;
/// Chat links for booking inquiries
pub mod messaging;
/// Package catalog
pub mod package;
/// Read-time payment views and status reconciliation
pub mod payment;
/// Role to menu and capability table
pub mod permissions;
/// Booking analytics and display formatting
pub mod report;
/// Guide date-range conflict detection
pub mod schedule;
/// Staff accounts and sessions
pub mod user;
