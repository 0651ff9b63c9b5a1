use chrono::NaiveDate;
use derive_more::Display;

use crate::model::attendance::ShiftKind;

/// Everything a payroll operation can reject or fail with.
#[derive(Debug, Display)]
pub enum PayrollError {
    #[display(fmt = "Already checked in on {}", _0)]
    DuplicateCheckIn(NaiveDate),

    #[display(fmt = "Amount must be a positive whole number")]
    InvalidAmount,

    #[display(
        fmt = "Requested {} exceeds available balance {}",
        requested,
        available
    )]
    InsufficientBalance { requested: i64, available: i64 },

    #[display(fmt = "Profile not found, create a profile first")]
    ProfileMissing,

    #[display(fmt = "Shift '{}' is not accepted by the active pay model", _0)]
    InvalidShift(ShiftKind),

    #[display(fmt = "No check-in recorded on {}", _0)]
    CheckInNotFound(NaiveDate),

    #[display(fmt = "Shift '{}' cannot be upgraded", _0)]
    ShiftNotUpgradable(ShiftKind),

    #[display(fmt = "Invalid month {}-{}", year, month)]
    InvalidMonth { year: i32, month: u32 },

    #[display(fmt = "Invalid profile: {}", _0)]
    InvalidProfile(String),

    #[display(fmt = "Pay rates can only be changed by an admin")]
    RatesLocked,

    #[display(fmt = "Email already registered")]
    EmailTaken,

    #[display(fmt = "Store error: {}", _0)]
    Store(sqlx::Error),
}

impl std::error::Error for PayrollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PayrollError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for PayrollError {
    fn from(e: sqlx::Error) -> Self {
        PayrollError::Store(e)
    }
}
