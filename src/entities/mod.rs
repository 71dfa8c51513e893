//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod booking;
pub mod coupon;
pub mod guide_assignment;
pub mod installment;
pub mod itinerary_day;
pub mod package;
pub mod sea_orm_active_enums;
pub mod system_state;
pub mod tour_guide;
pub mod user;

// Re-export specific types to avoid conflicts
pub use booking::{Column as BookingColumn, Entity as Booking, Model as BookingModel};
pub use coupon::{Column as CouponColumn, Entity as Coupon, Model as CouponModel};
pub use guide_assignment::{
    Column as GuideAssignmentColumn, Entity as GuideAssignment, Model as GuideAssignmentModel,
};
pub use installment::{
    Column as InstallmentColumn, Entity as Installment, Model as InstallmentModel,
};
pub use itinerary_day::{
    Column as ItineraryDayColumn, Entity as ItineraryDay, Model as ItineraryDayModel,
};
pub use package::{Column as PackageColumn, Entity as Package, Model as PackageModel};
pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
pub use tour_guide::{Column as TourGuideColumn, Entity as TourGuide, Model as TourGuideModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
