//! Package catalog business logic.
//!
//! Packages are soft-deleted: deactivating one keeps existing bookings intact but
//! hides it from listings and new bookings.

use crate::{
    entities::{Package, package, sea_orm_active_enums::Continent},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Loads a package by id inside any connection or transaction.
pub(crate) async fn find_package<C>(db: &C, package_id: i64) -> Result<package::Model>
where
    C: ConnectionTrait,
{
    Package::find_by_id(package_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::PackageNotFound {
            reference: package_id.to_string(),
        })
}

/// Creates a package after validating its name, length and price.
pub async fn create_package(
    db: &DatabaseConnection,
    name: String,
    continent: Continent,
    duration_days: i32,
    base_price: f64,
) -> Result<package::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Package name cannot be empty".to_string(),
        });
    }
    if duration_days < 1 {
        return Err(Error::Validation {
            message: format!("Package duration must be at least one day, got {duration_days}"),
        });
    }
    if !base_price.is_finite() || base_price <= 0.0 {
        return Err(Error::InvalidAmount { amount: base_price });
    }
    if get_package_by_name(db, &name).await?.is_some() {
        return Err(Error::Duplicate {
            entity: "Package",
            name,
        });
    }

    let model = package::ActiveModel {
        name: Set(name),
        continent: Set(continent),
        duration_days: Set(duration_days),
        base_price: Set(base_price),
        is_active: Set(true),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(package = %created.name, continent = %created.continent, "Created package");
    Ok(created)
}

/// Finds a package by its unique ID.
pub async fn get_package_by_id(
    db: &DatabaseConnection,
    package_id: i64,
) -> Result<Option<package::Model>> {
    Package::find_by_id(package_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a package by exact name, active or not.
pub async fn get_package_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<package::Model>> {
    Package::find()
        .filter(package::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all bookable packages, ordered alphabetically by name.
pub async fn list_active_packages(db: &DatabaseConnection) -> Result<Vec<package::Model>> {
    Package::find()
        .filter(package::Column::IsActive.eq(true))
        .order_by_asc(package::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every package including deactivated ones; used by reports, which
/// must still resolve packages of historical bookings.
pub async fn list_all_packages(db: &DatabaseConnection) -> Result<Vec<package::Model>> {
    Package::find()
        .order_by_asc(package::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Hides a package from the catalog.
pub async fn deactivate_package(db: &DatabaseConnection, package_id: i64) -> Result<package::Model> {
    let existing = find_package(db, package_id).await?;
    let mut active_model: package::ActiveModel = existing.into();
    active_model.is_active = Set(false);
    let updated = active_model.update(db).await?;
    info!(package = %updated.name, "Deactivated package");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_package_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let empty = create_package(&db, "  ".to_string(), Continent::Asia, 5, 100.0).await;
        assert!(matches!(empty, Err(Error::Validation { .. })));

        let zero_days =
            create_package(&db, "Bali".to_string(), Continent::Asia, 0, 100.0).await;
        assert!(matches!(zero_days, Err(Error::Validation { .. })));

        let free = create_package(&db, "Bali".to_string(), Continent::Asia, 5, 0.0).await;
        assert!(matches!(free, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_and_find_package() -> Result<()> {
        let db = setup_test_db().await?;
        let created =
            create_package(&db, " Bali Escape ".to_string(), Continent::Asia, 6, 1_250.0).await?;

        assert_eq!(created.name, "Bali Escape");
        assert!(created.is_active);

        let by_name = get_package_by_name(&db, "Bali Escape").await?.unwrap();
        assert_eq!(by_name.id, created.id);
        let by_id = get_package_by_id(&db, created.id).await?.unwrap();
        assert_eq!(by_id, created);

        let dup = create_package(&db, "Bali Escape".to_string(), Continent::Asia, 6, 1.0).await;
        assert!(matches!(dup, Err(Error::Duplicate { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_deactivated_packages_are_hidden() -> Result<()> {
        let db = setup_test_db().await?;
        let bali = create_test_package(&db, "Bali", 1_000.0).await?;
        create_test_package(&db, "Amsterdam", 900.0).await?;

        deactivate_package(&db, bali.id).await?;

        let active = list_active_packages(&db).await?;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Amsterdam");
        assert_eq!(list_all_packages(&db).await?.len(), 2);

        Ok(())
    }
}
