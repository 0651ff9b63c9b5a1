use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct WithdrawalRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 500)]
    pub amount: i64,
    #[schema(example = "2026-01-31T10:00:00Z", value_type = String, format = "date-time")]
    pub withdrawal_date: DateTime<Utc>,
}
