use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Category of a single day's attendance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShiftKind {
    /// 08:30 - 17:30
    Morning,
    /// 12:30 - 21:30
    Evening,
    /// 08:30 - 21:30, paid as flat overtime hours
    Overtime,
    /// 08:30 - 21:30, paid at the full-day rate
    Fullday,
}

impl ShiftKind {
    pub fn hours(self) -> u32 {
        match self {
            ShiftKind::Morning | ShiftKind::Evening => 8,
            ShiftKind::Overtime | ShiftKind::Fullday => 13,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShiftKind::Morning => "Morning (08:30 - 17:30)",
            ShiftKind::Evening => "Evening (12:30 - 21:30)",
            ShiftKind::Overtime => "Overtime (08:30 - 21:30)",
            ShiftKind::Fullday => "Full day (08:30 - 21:30)",
        }
    }

    /// Morning and evening are the plain shifts that can be upgraded.
    pub fn is_normal(self) -> bool {
        matches!(self, ShiftKind::Morning | ShiftKind::Evening)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub shift: ShiftKind,
}

impl AttendanceRecord {
    pub fn new(date: NaiveDate, shift: ShiftKind) -> Self {
        Self { date, shift }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn shift_names_round_trip_through_strings() {
        for shift in ShiftKind::iter() {
            assert_eq!(ShiftKind::from_str(shift.as_ref()).unwrap(), shift);
        }
        assert_eq!(ShiftKind::Fullday.to_string(), "fullday");
        assert!(ShiftKind::from_str("night").is_err());
    }

    #[test]
    fn json_uses_lowercase_names() {
        let json = serde_json::to_string(&ShiftKind::Overtime).unwrap();
        assert_eq!(json, "\"overtime\"");
    }

    #[test]
    fn only_plain_shifts_are_normal() {
        assert!(ShiftKind::Morning.is_normal());
        assert!(ShiftKind::Evening.is_normal());
        assert!(!ShiftKind::Overtime.is_normal());
        assert!(!ShiftKind::Fullday.is_normal());
        assert_eq!(ShiftKind::Fullday.hours(), 13);
    }
}
