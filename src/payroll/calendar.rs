use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceRecord, ShiftKind};
use crate::payroll::error::PayrollError;

const DATE_KEY: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CalendarDay {
    #[schema(example = "2026-01-04")]
    pub date: String,
    pub is_current_month: bool,
    pub has_check_in: bool,
    pub shift: Option<ShiftKind>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CalendarMonth {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: u32,
    /// Sunday to Saturday rows
    pub weeks: Vec<Vec<CalendarDay>>,
}

/// Lays out `month` as whole Sunday-first weeks and marks recorded shifts.
///
/// Records are matched on their `YYYY-MM-DD` key so no time zone can move a
/// check-in onto a neighbouring cell.
pub fn month_grid(
    year: i32,
    month: u32,
    records: &[AttendanceRecord],
) -> Result<CalendarMonth, PayrollError> {
    let invalid = || PayrollError::InvalidMonth { year, month };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next_first.pred_opt().ok_or_else(invalid)?;

    let start = first - Duration::days(i64::from(first.weekday().num_days_from_sunday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_sunday()));

    let by_key: HashMap<String, ShiftKind> = records
        .iter()
        .map(|r| (r.date.format(DATE_KEY).to_string(), r.shift))
        .collect();

    let mut weeks = Vec::new();
    let mut week = Vec::with_capacity(7);
    let mut day = start;
    while day <= end {
        let key = day.format(DATE_KEY).to_string();
        let shift = by_key.get(&key).copied();
        week.push(CalendarDay {
            date: key,
            is_current_month: day.month() == month && day.year() == year,
            has_check_in: shift.is_some(),
            shift,
        });

        if week.len() == 7 {
            weeks.push(std::mem::replace(&mut week, Vec::with_capacity(7)));
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    Ok(CalendarMonth { year, month, weeks })
}
