//! Agency configuration loading from config.toml
//!
//! The config file names the agency, sets the payment policy, and lists packages,
//! guides and coupons to seed into the database on first run. Seeding is idempotent:
//! entries whose name or code already exists are skipped.

use crate::{
    core::{
        coupon::{self, NewCoupon},
        guide,
        installment::PaymentPolicy,
        package,
    },
    entities::sea_orm_active_enums::{Continent, CouponType, CustomerTier},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyConfig {
    /// Who the agency is
    pub agency: AgencyInfo,
    /// Installment and deposit rules
    #[serde(default)]
    pub payment_policy: PaymentPolicy,
    /// Packages to seed
    #[serde(default)]
    pub packages: Vec<PackageSeed>,
    /// Guides to seed
    #[serde(default)]
    pub guides: Vec<GuideSeed>,
    /// Coupons to seed
    #[serde(default)]
    pub coupons: Vec<CouponSeed>,
}

/// The `[agency]` table
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyInfo {
    /// Display name used in customer messages
    pub name: String,
    /// ISO currency code for new bookings
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Number customers message on WhatsApp
    pub whatsapp_number: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

/// A `[[packages]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSeed {
    /// Unique package name
    pub name: String,
    /// Continent of the destination
    pub continent: Continent,
    /// Length in days
    pub duration_days: i32,
    /// Price per traveller
    pub base_price: f64,
}

/// A `[[guides]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct GuideSeed {
    /// Unique guide name
    pub name: String,
    /// Spoken languages
    #[serde(default)]
    pub languages: Vec<String>,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
}

/// A `[[coupons]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct CouponSeed {
    /// Unique code
    pub code: String,
    /// Discount kind
    pub coupon_type: CouponType,
    /// Percentage or amount
    pub value: f64,
    /// Maximum redemptions
    pub usage_limit: Option<i32>,
    /// Minimum booking amount
    pub min_amount: Option<f64>,
    /// Maximum booking amount
    pub max_amount: Option<f64>,
    /// Eligible continents, empty for all
    #[serde(default)]
    pub continents: Vec<Continent>,
    /// Lowest eligible tier
    pub min_tier: Option<CustomerTier>,
    /// First valid day
    pub valid_from: NaiveDate,
    /// Last valid day
    pub valid_until: NaiveDate,
}

impl CouponSeed {
    fn to_new_coupon(&self) -> NewCoupon {
        let mut new = NewCoupon::new(
            &self.code,
            self.coupon_type,
            self.value,
            self.valid_from,
            self.valid_until,
        );
        new.usage_limit = self.usage_limit;
        new.min_amount = self.min_amount;
        new.max_amount = self.max_amount;
        new.applicable_continents.clone_from(&self.continents);
        new.min_tier = self.min_tier;
        new
    }
}

/// How many entries a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// New packages
    pub packages: usize,
    /// New guides
    pub guides: usize,
    /// New coupons
    pub coupons: usize,
}

/// Loads agency configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AgencyConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

/// Parses agency configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AgencyConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse agency config: {e}"),
    })
}

/// Loads the file named by `AGENCY_CONFIG`, or `./config.toml`.
pub fn load_default_config() -> Result<AgencyConfig> {
    let path = std::env::var("AGENCY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    load_config(path)
}

/// Inserts configured packages, guides and coupons that are not in the database yet.
pub async fn seed_catalog(db: &DatabaseConnection, config: &AgencyConfig) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for seed in &config.packages {
        if package::get_package_by_name(db, &seed.name).await?.is_none() {
            package::create_package(
                db,
                seed.name.clone(),
                seed.continent,
                seed.duration_days,
                seed.base_price,
            )
            .await?;
            summary.packages += 1;
        }
    }

    for seed in &config.guides {
        if guide::get_guide_by_name(db, &seed.name).await?.is_none() {
            guide::create_guide(db, seed.name.clone(), &seed.languages, seed.phone.clone())
                .await?;
            summary.guides += 1;
        }
    }

    for seed in &config.coupons {
        if coupon::get_coupon_by_code(db, &seed.code).await?.is_none() {
            coupon::create_coupon(db, seed.to_new_coupon()).await?;
            summary.coupons += 1;
        }
    }

    info!(
        packages = summary.packages,
        guides = summary.guides,
        coupons = summary.coupons,
        "Seeded catalog"
    );

    Ok(summary)
}
