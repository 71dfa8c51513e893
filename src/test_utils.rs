//! Shared test utilities for the travel desk.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        booking::{self, CustomerInfo, NewBooking},
        coupon::{self, NewCoupon},
        guide, package, user,
    },
    entities,
    entities::sea_orm_active_enums::{Continent, CouponType, CustomerTier, Role},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test package in Europe lasting seven days.
pub async fn create_test_package(
    db: &DatabaseConnection,
    name: &str,
    base_price: f64,
) -> Result<entities::package::Model> {
    package::create_package(db, name.to_string(), Continent::Europe, 7, base_price).await
}

/// A booking request for two normal-tier travellers, 2024-06-10 to 2024-06-20,
/// priced from the package.
#[must_use]
pub fn test_new_booking(package_id: i64) -> NewBooking {
    NewBooking {
        customer: CustomerInfo {
            id: "CUST-001".to_string(),
            name: "Test Customer".to_string(),
            email: "customer@example.com".to_string(),
            phone: "+15550100".to_string(),
            tier: CustomerTier::Normal,
        },
        package_id,
        travel_start: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap_or_default(),
        travel_end: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap_or_default(),
        participants: 2,
        total_override: None,
        currency: "USD".to_string(),
    }
}

/// Sets up a database with one package and one booking whose total is `total`.
/// Returns (db, booking).
pub async fn setup_with_booking(
    total: f64,
) -> Result<(DatabaseConnection, entities::booking::Model)> {
    let db = setup_test_db().await?;
    let pkg = create_test_package(&db, "Test Package", 1_000.0).await?;

    let mut new = test_new_booking(pkg.id);
    new.total_override = Some(total);
    let created = booking::create_booking(&db, new).await?;

    Ok((db, created))
}

/// Creates an unrestricted coupon valid from 2020 through 2099.
pub async fn create_test_coupon(
    db: &DatabaseConnection,
    code: &str,
    coupon_type: CouponType,
    value: f64,
) -> Result<entities::coupon::Model> {
    let new = NewCoupon::new(
        code,
        coupon_type,
        value,
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or_default(),
    );
    coupon::create_coupon(db, new).await
}

/// Creates an English-speaking guide.
pub async fn create_test_guide(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::tour_guide::Model> {
    guide::create_guide(
        db,
        name.to_string(),
        &["english".to_string()],
        "+15550199".to_string(),
    )
    .await
}

/// Creates a user with the given Discord id and role.
pub async fn create_test_user(
    db: &DatabaseConnection,
    discord_id: &str,
    role: Role,
) -> Result<entities::user::Model> {
    user::create_user(db, discord_id.to_string(), format!("User {discord_id}"), role).await
}
