//! Tour guide conflict detection.
//!
//! A guide conflicts with a candidate tour when any of their live assignments shares at
//! least one day with it. Conflicts are advisory: callers may still assign the guide.

use crate::{
    entities::{guide_assignment, sea_orm_active_enums::AssignmentStatus, tour_guide},
    errors::{Error, Result},
};
use chrono::NaiveDate;

/// Closed range of days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting one that ends before it starts.
    ///
    /// # Errors
    /// `Error::InvalidDateRange` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, counting both ends.
    #[must_use]
    pub fn days(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_days() + 1
    }

    /// Whether `day` falls inside the range.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether the two ranges share at least one day.
    ///
    /// Equivalent to: this range starts inside `other`, ends inside it, or
    /// swallows it whole.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl TryFrom<&guide_assignment::Model> for DateRange {
    type Error = Error;

    fn try_from(assignment: &guide_assignment::Model) -> Result<Self> {
        Self::new(assignment.tour_start, assignment.tour_end)
    }
}

/// A guide together with all of their assignments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideSchedule {
    /// The guide
    pub guide: tour_guide::Model,
    /// Every assignment the guide holds, any status
    pub assignments: Vec<guide_assignment::Model>,
}

/// A guide who is already busy during the candidate range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideConflict {
    /// The guide
    pub guide: tour_guide::Model,
    /// Their assignments overlapping the candidate range
    pub overlapping: Vec<guide_assignment::Model>,
}

/// Result of checking a candidate range against every guide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    /// Guides with at least one overlapping assignment
    pub conflicts: Vec<GuideConflict>,
    /// Guides with none
    pub available: Vec<tour_guide::Model>,
}

/// Assignments in `assignments` that overlap `candidate`. Cancelled assignments and
/// rows with an inverted date range never count.
#[must_use]
pub fn overlapping_assignments<'a>(
    candidate: &DateRange,
    assignments: &'a [guide_assignment::Model],
) -> Vec<&'a guide_assignment::Model> {
    assignments
        .iter()
        .filter(|assignment| assignment.status != AssignmentStatus::Cancelled)
        .filter(|assignment| {
            DateRange::try_from(*assignment).is_ok_and(|existing| candidate.overlaps(&existing))
        })
        .collect()
}

/// Splits guides into conflicted and available for a candidate range.
///
/// Guide order is preserved in both lists.
#[must_use]
pub fn find_conflicts(candidate: &DateRange, schedules: &[GuideSchedule]) -> ConflictReport {
    let mut report = ConflictReport::default();

    for schedule in schedules {
        let overlapping = overlapping_assignments(candidate, &schedule.assignments);
        if overlapping.is_empty() {
            report.available.push(schedule.guide.clone());
        } else {
            report.conflicts.push(GuideConflict {
                guide: schedule.guide.clone(),
                overlapping: overlapping.into_iter().cloned().collect(),
            });
        }
    }

    report
}
