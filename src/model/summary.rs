use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::ShiftKind;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentCheckIn {
    #[schema(example = "somchai@example.com")]
    pub user_email: String,
    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub check_date: NaiveDate,
    pub shift: ShiftKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecentWithdrawal {
    #[schema(example = "somchai@example.com")]
    pub user_email: String,
    #[schema(example = 500)]
    pub amount: i64,
    #[schema(example = "2026-01-31T10:00:00Z", value_type = String, format = "date-time")]
    pub withdrawal_date: DateTime<Utc>,
}

/// Organisation-wide totals shown to admins.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSummary {
    #[schema(example = 12)]
    pub total_users: i64,
    #[schema(example = 240)]
    pub total_check_ins: i64,
    #[schema(example = 31)]
    pub total_withdrawals: i64,
    #[schema(example = 45000)]
    pub total_withdrawn: i64,
    pub recent_check_ins: Vec<RecentCheckIn>,
    pub recent_withdrawals: Vec<RecentWithdrawal>,
}

pub const RECENT_LIMIT: usize = 5;
pub const UNKNOWN_EMAIL: &str = "Unknown";
