//! Tour guide roster, assignments and itineraries.
//!
//! Assigning a guide never fails because of a schedule clash; the clash is logged
//! and handed back to the caller so staff can decide what to do about it.

use crate::{
    core::{
        booking,
        schedule::{self, ConflictReport, DateRange, GuideSchedule},
    },
    entities::{
        GuideAssignment, ItineraryDay, TourGuide, guide_assignment, itinerary_day,
        sea_orm_active_enums::{AssignmentStatus, BookingStatus},
        tour_guide,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{info, warn};

/// Input for [`assign_guide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAssignment {
    /// Guide to assign
    pub guide_id: i64,
    /// Booking whose group the guide leads
    pub booking_id: i64,
    /// Destination label
    pub destination: String,
    /// First tour day
    pub tour_start: NaiveDate,
    /// Last tour day
    pub tour_end: NaiveDate,
    /// Travellers in the group
    pub group_size: i32,
}

/// A persisted assignment plus any of the guide's other assignments it overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentOutcome {
    /// The new assignment
    pub assignment: guide_assignment::Model,
    /// Live assignments of the same guide sharing at least one day
    pub conflicts: Vec<guide_assignment::Model>,
}

/// Normalizes a language list into the stored comma-separated form, keeping the
/// first occurrence of each language.
fn join_languages(languages: &[String]) -> String {
    let mut seen = HashSet::new();
    let cleaned: Vec<String> = languages
        .iter()
        .map(|lang| lang.trim().to_lowercase())
        .filter(|lang| !lang.is_empty() && seen.insert(lang.clone()))
        .collect();
    cleaned.join(",")
}

/// Languages a guide speaks.
#[must_use]
pub fn languages(guide: &tour_guide::Model) -> Vec<&str> {
    guide
        .languages
        .split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .collect()
}

/// Loads a guide by id inside any connection or transaction.
pub(crate) async fn find_guide<C>(db: &C, guide_id: i64) -> Result<tour_guide::Model>
where
    C: ConnectionTrait,
{
    TourGuide::find_by_id(guide_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::GuideNotFound {
            reference: guide_id.to_string(),
        })
}

async fn find_assignment<C>(db: &C, assignment_id: i64) -> Result<guide_assignment::Model>
where
    C: ConnectionTrait,
{
    GuideAssignment::find_by_id(assignment_id)
        .one(db)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })
}

/// Adds a guide to the roster.
pub async fn create_guide(
    db: &DatabaseConnection,
    name: String,
    languages: &[String],
    phone: String,
) -> Result<tour_guide::Model> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Guide name cannot be empty".to_string(),
        });
    }
    if get_guide_by_name(db, &name).await?.is_some() {
        return Err(Error::Duplicate {
            entity: "Tour guide",
            name,
        });
    }

    let model = tour_guide::ActiveModel {
        name: Set(name),
        languages: Set(join_languages(languages)),
        phone: Set(phone.trim().to_string()),
        is_active: Set(true),
        ..Default::default()
    };

    let created = model.insert(db).await?;
    info!(guide = %created.name, "Added tour guide");
    Ok(created)
}

/// Finds a guide by id.
pub async fn get_guide_by_id(
    db: &DatabaseConnection,
    guide_id: i64,
) -> Result<Option<tour_guide::Model>> {
    TourGuide::find_by_id(guide_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a guide by exact name.
pub async fn get_guide_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<tour_guide::Model>> {
    TourGuide::find()
        .filter(tour_guide::Column::Name.eq(name.trim()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Active guides, alphabetical.
pub async fn list_active_guides(db: &DatabaseConnection) -> Result<Vec<tour_guide::Model>> {
    TourGuide::find()
        .filter(tour_guide::Column::IsActive.eq(true))
        .order_by_asc(tour_guide::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Takes a guide off the roster. Their assignments are kept.
pub async fn deactivate_guide(db: &DatabaseConnection, guide_id: i64) -> Result<tour_guide::Model> {
    let existing = find_guide(db, guide_id).await?;
    let mut active_model: tour_guide::ActiveModel = existing.into();
    active_model.is_active = Set(false);
    let updated = active_model.update(db).await?;
    info!(guide = %updated.name, "Deactivated tour guide");
    Ok(updated)
}

/// Every assignment held by a guide, earliest tour first.
pub async fn get_assignments_for_guide(
    db: &DatabaseConnection,
    guide_id: i64,
) -> Result<Vec<guide_assignment::Model>> {
    GuideAssignment::find()
        .filter(guide_assignment::Column::GuideId.eq(guide_id))
        .order_by_asc(guide_assignment::Column::TourStart)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads each active guide together with their assignments.
pub async fn load_guide_schedules(db: &DatabaseConnection) -> Result<Vec<GuideSchedule>> {
    let rows = TourGuide::find()
        .filter(tour_guide::Column::IsActive.eq(true))
        .order_by_asc(tour_guide::Column::Name)
        .find_with_related(GuideAssignment)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(guide, assignments)| GuideSchedule { guide, assignments })
        .collect())
}

/// Which active guides are free for `range` and which are already booked.
pub async fn check_availability(db: &DatabaseConnection, range: &DateRange) -> Result<ConflictReport> {
    let schedules = load_guide_schedules(db).await?;
    let report = schedule::find_conflicts(range, &schedules);

    info!(
        start = %range.start(),
        end = %range.end(),
        available = report.available.len(),
        conflicted = report.conflicts.len(),
        "Checked guide availability"
    );

    Ok(report)
}

/// Assigns a guide to a booking's tour.
///
/// Overlapping assignments do not block the assignment; they are returned in
/// [`AssignmentOutcome::conflicts`] and logged as a warning.
pub async fn assign_guide(db: &DatabaseConnection, new: NewAssignment) -> Result<AssignmentOutcome> {
    let range = DateRange::new(new.tour_start, new.tour_end)?;
    if new.group_size < 1 {
        return Err(Error::Validation {
            message: format!("Group size must be at least 1, got {}", new.group_size),
        });
    }
    let destination = new.destination.trim().to_string();
    if destination.is_empty() {
        return Err(Error::Validation {
            message: "Destination cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    let guide = find_guide(&txn, new.guide_id).await?;
    if !guide.is_active {
        return Err(Error::GuideNotFound {
            reference: guide.name,
        });
    }

    let booked = booking::find_booking(&txn, new.booking_id).await?;
    if booked.status == BookingStatus::Cancelled {
        return Err(Error::Validation {
            message: format!("booking {} is cancelled", booked.booking_number),
        });
    }

    let existing = GuideAssignment::find()
        .filter(guide_assignment::Column::GuideId.eq(guide.id))
        .all(&txn)
        .await?;
    let conflicts: Vec<guide_assignment::Model> = schedule::overlapping_assignments(&range, &existing)
        .into_iter()
        .cloned()
        .collect();

    let model = guide_assignment::ActiveModel {
        guide_id: Set(guide.id),
        booking_id: Set(booked.id),
        destination: Set(destination),
        tour_start: Set(range.start()),
        tour_end: Set(range.end()),
        group_size: Set(new.group_size),
        status: Set(AssignmentStatus::Upcoming),
        ..Default::default()
    };
    let assignment = model.insert(&txn).await?;

    txn.commit().await?;

    if conflicts.is_empty() {
        info!(guide = %guide.name, booking = %booked.booking_number, "Guide assigned");
    } else {
        warn!(
            guide = %guide.name,
            booking = %booked.booking_number,
            overlapping = conflicts.len(),
            "Guide assigned despite schedule conflict"
        );
    }

    Ok(AssignmentOutcome {
        assignment,
        conflicts,
    })
}

/// Moves an assignment along upcoming → in progress → completed, or cancels it.
pub async fn update_assignment_status(
    db: &DatabaseConnection,
    assignment_id: i64,
    new_status: AssignmentStatus,
) -> Result<guide_assignment::Model> {
    let existing = find_assignment(db, assignment_id).await?;

    if !existing.status.can_transition_to(new_status) {
        return Err(Error::InvalidTransition {
            entity: "assignment",
            from: existing.status.to_string(),
            to: new_status.to_string(),
        });
    }

    let mut active_model: guide_assignment::ActiveModel = existing.into();
    active_model.status = Set(new_status);
    let updated = active_model.update(db).await?;
    info!(assignment = updated.id, status = %new_status, "Assignment status changed");
    Ok(updated)
}

/// Adds one day to an assignment's itinerary.
///
/// Day numbers start at 1, fall within the tour and are unique per assignment.
pub async fn add_itinerary_day(
    db: &DatabaseConnection,
    assignment_id: i64,
    day_number: i32,
    title: String,
    activities: String,
) -> Result<itinerary_day::Model> {
    let assignment = find_assignment(db, assignment_id).await?;
    let tour_days = DateRange::try_from(&assignment)?.days();

    if day_number < 1 || i64::from(day_number) > tour_days {
        return Err(Error::Validation {
            message: format!("Day {day_number} is outside the {tour_days}-day tour"),
        });
    }

    let taken = ItineraryDay::find()
        .filter(itinerary_day::Column::AssignmentId.eq(assignment_id))
        .filter(itinerary_day::Column::DayNumber.eq(day_number))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::Duplicate {
            entity: "Itinerary day",
            name: format!("day {day_number} of assignment {assignment_id}"),
        });
    }

    let model = itinerary_day::ActiveModel {
        assignment_id: Set(assignment_id),
        day_number: Set(day_number),
        title: Set(title.trim().to_string()),
        activities: Set(activities.trim().to_string()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// An assignment's itinerary in day order.
pub async fn get_itinerary(
    db: &DatabaseConnection,
    assignment_id: i64,
) -> Result<Vec<itinerary_day::Model>> {
    ItineraryDay::find()
        .filter(itinerary_day::Column::AssignmentId.eq(assignment_id))
        .order_by_asc(itinerary_day::Column::DayNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn new_assignment(guide_id: i64, booking_id: i64, start: NaiveDate, end: NaiveDate) -> NewAssignment {
        NewAssignment {
            guide_id,
            booking_id,
            destination: "Kyoto".to_string(),
            tour_start: start,
            tour_end: end,
            group_size: 10,
        }
    }

    #[tokio::test]
    async fn test_create_guide_normalizes_languages() -> Result<()> {
        let db = setup_test_db().await?;
        let guide = create_guide(
            &db,
            "Aiko Tanaka".to_string(),
            &[
                " English".to_string(),
                "JAPANESE".to_string(),
                String::new(),
                "english".to_string(),
            ],
            "+81 90 0000 0000".to_string(),
        )
        .await?;

        assert_eq!(guide.languages, "english,japanese");
        assert_eq!(languages(&guide), vec!["english", "japanese"]);

        let dup = create_guide(&db, "Aiko Tanaka".to_string(), &[], String::new()).await;
        assert!(matches!(dup, Err(Error::Duplicate { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_assign_guide_reports_conflict_but_persists() -> Result<()> {
        let (db, booking) = setup_with_booking(24_800.0).await?;
        let guide = create_test_guide(&db, "Aiko").await?;

        let first = assign_guide(
            &db,
            new_assignment(guide.id, booking.id, date(2024, 4, 15), date(2024, 4, 22)),
        )
        .await?;
        assert!(first.conflicts.is_empty());

        let second = assign_guide(
            &db,
            new_assignment(guide.id, booking.id, date(2024, 4, 18), date(2024, 4, 24)),
        )
        .await?;
        assert_eq!(second.conflicts.len(), 1);
        assert_eq!(second.conflicts[0].id, first.assignment.id);

        assert_eq!(get_assignments_for_guide(&db, guide.id).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_check_availability() -> Result<()> {
        let (db, booking) = setup_with_booking(24_800.0).await?;
        let busy = create_test_guide(&db, "Aiko").await?;
        let free = create_test_guide(&db, "Bruno").await?;
        let retired = create_test_guide(&db, "Chidi").await?;
        deactivate_guide(&db, retired.id).await?;

        assign_guide(
            &db,
            new_assignment(busy.id, booking.id, date(2024, 4, 15), date(2024, 4, 22)),
        )
        .await?;

        let range = DateRange::new(date(2024, 4, 18), date(2024, 4, 24))?;
        let report = check_availability(&db, &range).await?;

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].guide.id, busy.id);
        assert_eq!(report.available.len(), 1);
        assert_eq!(report.available[0].id, free.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_assignment_frees_guide() -> Result<()> {
        let (db, booking) = setup_with_booking(24_800.0).await?;
        let guide = create_test_guide(&db, "Aiko").await?;
        let outcome = assign_guide(
            &db,
            new_assignment(guide.id, booking.id, date(2024, 4, 15), date(2024, 4, 22)),
        )
        .await?;

        update_assignment_status(&db, outcome.assignment.id, AssignmentStatus::Cancelled).await?;

        let range = DateRange::new(date(2024, 4, 18), date(2024, 4, 24))?;
        let report = check_availability(&db, &range).await?;
        assert!(report.conflicts.is_empty());

        let revive =
            update_assignment_status(&db, outcome.assignment.id, AssignmentStatus::Upcoming).await;
        assert!(matches!(revive, Err(Error::InvalidTransition { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_assign_guide_validation() -> Result<()> {
        let (db, booking) = setup_with_booking(24_800.0).await?;
        let guide = create_test_guide(&db, "Aiko").await?;

        let backwards = assign_guide(
            &db,
            new_assignment(guide.id, booking.id, date(2024, 4, 22), date(2024, 4, 15)),
        )
        .await;
        assert!(matches!(backwards, Err(Error::InvalidDateRange { .. })));

        let no_guide = assign_guide(
            &db,
            new_assignment(999, booking.id, date(2024, 4, 15), date(2024, 4, 22)),
        )
        .await;
        assert!(matches!(no_guide, Err(Error::GuideNotFound { .. })));

        let no_booking = assign_guide(
            &db,
            new_assignment(guide.id, 999, date(2024, 4, 15), date(2024, 4, 22)),
        )
        .await;
        assert!(matches!(no_booking, Err(Error::BookingNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_itinerary_days() -> Result<()> {
        let (db, booking) = setup_with_booking(24_800.0).await?;
        let guide = create_test_guide(&db, "Aiko").await?;
        let outcome = assign_guide(
            &db,
            new_assignment(guide.id, booking.id, date(2024, 4, 15), date(2024, 4, 17)),
        )
        .await?;
        let id = outcome.assignment.id;

        add_itinerary_day(&db, id, 2, "Fushimi Inari".to_string(), "Hike".to_string()).await?;
        add_itinerary_day(&db, id, 1, "Arrival".to_string(), "Check in".to_string()).await?;

        let dup = add_itinerary_day(&db, id, 1, "Again".to_string(), String::new()).await;
        assert!(matches!(dup, Err(Error::Duplicate { .. })));

        let past_end = add_itinerary_day(&db, id, 4, "Extra".to_string(), String::new()).await;
        assert!(matches!(past_end, Err(Error::Validation { .. })));

        let days = get_itinerary(&db, id).await?;
        assert_eq!(
            days.iter().map(|d| d.day_number).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(days[0].title, "Arrival");

        Ok(())
    }
}
