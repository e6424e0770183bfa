// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Calendar arithmetic for recurring schedules.
//!
//! Months and years are added with end-of-month clamping: Jan 31 plus one
//! month is the last day of February, and Feb 29 plus one year is Feb 28
//! when the target year is not a leap year.

use chrono::{Days, Months, NaiveDate};
use thiserror::Error;

use crate::models::Frequency;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("advancing {date} by one {frequency} period leaves the supported calendar range")]
    OutOfRange { date: NaiveDate, frequency: Frequency },
}

/// The due date one period after `date`.
pub fn advance(date: NaiveDate, frequency: Frequency) -> Result<NaiveDate, ScheduleError> {
    let next = match frequency {
        Frequency::Daily => date.checked_add_days(Days::new(1)),
        Frequency::Weekly => date.checked_add_days(Days::new(7)),
        Frequency::Monthly => date.checked_add_months(Months::new(1)),
        Frequency::Yearly => date.checked_add_months(Months::new(12)),
    };
    next.ok_or(ScheduleError::OutOfRange { date, frequency })
}

/// Dates a schedule owes up to and including `as_of`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuePlan {
    /// One date per elapsed period, oldest first.
    pub dates: Vec<NaiveDate>,
    /// First due date strictly after `as_of`.
    pub next_due: NaiveDate,
}

/// Walk a schedule from `next_due` until it passes `as_of`.
///
/// Returns an empty plan (and `next_due` unchanged) when nothing is due.
pub fn due_dates(
    next_due: NaiveDate,
    frequency: Frequency,
    as_of: NaiveDate,
) -> Result<DuePlan, ScheduleError> {
    let mut dates = Vec::new();
    let mut cursor = next_due;
    while cursor <= as_of {
        dates.push(cursor);
        cursor = advance(cursor, frequency)?;
    }
    Ok(DuePlan {
        dates,
        next_due: cursor,
    })
}

/// First tick of the schedule anchored at `start` that falls on or after `floor`.
pub fn first_on_or_after(
    start: NaiveDate,
    frequency: Frequency,
    floor: NaiveDate,
) -> Result<NaiveDate, ScheduleError> {
    let mut cursor = start;
    while cursor < floor {
        cursor = advance(cursor, frequency)?;
    }
    Ok(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_and_weekly_add_fixed_days() {
        assert_eq!(advance(d(2024, 12, 31), Frequency::Daily).unwrap(), d(2025, 1, 1));
        assert_eq!(advance(d(2024, 2, 26), Frequency::Weekly).unwrap(), d(2024, 3, 4));
    }

    #[test]
    fn monthly_keeps_day_of_month_when_it_exists() {
        assert_eq!(advance(d(2024, 1, 15), Frequency::Monthly).unwrap(), d(2024, 2, 15));
        assert_eq!(advance(d(2024, 12, 15), Frequency::Monthly).unwrap(), d(2025, 1, 15));
    }

    #[test]
    fn monthly_clamps_to_end_of_month() {
        assert_eq!(advance(d(2024, 1, 31), Frequency::Monthly).unwrap(), d(2024, 2, 29));
        assert_eq!(advance(d(2023, 1, 31), Frequency::Monthly).unwrap(), d(2023, 2, 28));
        assert_eq!(advance(d(2024, 3, 31), Frequency::Monthly).unwrap(), d(2024, 4, 30));
    }

    #[test]
    fn yearly_clamps_leap_day() {
        assert_eq!(advance(d(2024, 2, 29), Frequency::Yearly).unwrap(), d(2025, 2, 28));
        assert_eq!(advance(d(2023, 3, 1), Frequency::Yearly).unwrap(), d(2024, 3, 1));
    }

    #[test]
    fn advance_reports_calendar_overflow() {
        let err = advance(NaiveDate::MAX, Frequency::Daily).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::OutOfRange {
                date: NaiveDate::MAX,
                frequency: Frequency::Daily
            }
        );
    }

    #[test]
    fn due_dates_cover_every_elapsed_period() {
        let plan = due_dates(d(2024, 1, 15), Frequency::Monthly, d(2024, 4, 20)).unwrap();
        assert_eq!(
            plan.dates,
            vec![d(2024, 1, 15), d(2024, 2, 15), d(2024, 3, 15), d(2024, 4, 15)]
        );
        assert_eq!(plan.next_due, d(2024, 5, 15));
    }

    #[test]
    fn due_dates_include_as_of_itself() {
        let plan = due_dates(d(2024, 6, 1), Frequency::Weekly, d(2024, 6, 8)).unwrap();
        assert_eq!(plan.dates, vec![d(2024, 6, 1), d(2024, 6, 8)]);
        assert_eq!(plan.next_due, d(2024, 6, 15));
    }

    #[test]
    fn due_dates_empty_when_not_yet_due() {
        let plan = due_dates(d(2024, 6, 2), Frequency::Daily, d(2024, 6, 1)).unwrap();
        assert!(plan.dates.is_empty());
        assert_eq!(plan.next_due, d(2024, 6, 2));
    }

    #[test]
    fn first_on_or_after_walks_from_anchor() {
        let tick = first_on_or_after(d(2024, 1, 10), Frequency::Weekly, d(2024, 1, 20)).unwrap();
        assert_eq!(tick, d(2024, 1, 24));
        let same = first_on_or_after(d(2024, 1, 10), Frequency::Weekly, d(2024, 1, 17)).unwrap();
        assert_eq!(same, d(2024, 1, 17));
        let anchor = first_on_or_after(d(2024, 5, 1), Frequency::Monthly, d(2024, 1, 1)).unwrap();
        assert_eq!(anchor, d(2024, 5, 1));
    }
}
