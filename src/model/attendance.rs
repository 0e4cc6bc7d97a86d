use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A persisted fact that a check-in code was used against an event at a
/// given time. Created exactly once per accepted check-in; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub event_id: u64,
    #[schema(example = "ABC123")]
    pub checkin_code: String,
    #[schema(example = "2024-12-20T10:00:00Z", format = "date-time", value_type = String)]
    pub checked_in_at: DateTime<Utc>,
    #[schema(example = "2024-12-20T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "2024-12-20T10:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}
