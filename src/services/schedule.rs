//! Service date generation for new customers.
//!
//! Both generators are pure: they only turn their input into an ordered list
//! of dates. [`number_services`] then assigns service numbers from list
//! position, so numbering never depends on insertion order in the store.

use chrono::{Months, NaiveDate};
use thiserror::Error;

const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("numberOfServices must be at least 1, got {0}")]
    NonPositiveCount(i64),

    #[error("at least one service date is required")]
    NoDates,

    #[error("scheduled date is out of range")]
    DateOutOfRange,
}

/// A generated visit before it is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedService {
    pub service_number: i64,
    pub scheduled_date: NaiveDate,
}

/// Number of visits actually scheduled for a requested count.
///
/// The requested count is treated as a spacing factor: `max(1, 12 / desired)`
/// visits are produced. A request for 4 therefore yields 3 visits.
pub fn actual_service_count(desired_count: i64) -> Result<u32, ScheduleError> {
    if desired_count <= 0 {
        return Err(ScheduleError::NonPositiveCount(desired_count));
    }
    let per_year = i64::from(MONTHS_PER_YEAR) / desired_count;
    // per_year is in 0..=12 here
    Ok((per_year as u32).max(1))
}

/// Spreads `actual_service_count(desired_count)` visits evenly over the twelve
/// months starting at `joining_date`. The first visit is on the joining date.
///
/// Months are added to the joining date directly, so a joining day missing
/// from a target month is clamped to that month's last day.
pub fn generate_automatic_schedule(
    joining_date: NaiveDate,
    desired_count: i64,
) -> Result<Vec<NaiveDate>, ScheduleError> {
    let count = actual_service_count(desired_count)?;
    let interval = MONTHS_PER_YEAR / count;

    (0..count)
        .map(|i| {
            joining_date
                .checked_add_months(Months::new(i * interval))
                .ok_or(ScheduleError::DateOutOfRange)
        })
        .collect()
}

/// Orders caller-supplied dates ascending.
pub fn generate_manual_schedule(mut dates: Vec<NaiveDate>) -> Result<Vec<NaiveDate>, ScheduleError> {
    if dates.is_empty() {
        return Err(ScheduleError::NoDates);
    }
    dates.sort_unstable();
    Ok(dates)
}

/// Assigns 1-based service numbers by position in an ordered date list.
pub fn number_services(dates: &[NaiveDate]) -> Vec<PlannedService> {
    dates
        .iter()
        .enumerate()
        .map(|(idx, &scheduled_date)| PlannedService {
            service_number: idx as i64 + 1,
            scheduled_date,
        })
        .collect()
}
