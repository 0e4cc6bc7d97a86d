use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "Event starting soon")]
    pub title: String,
    #[schema(example = "Tech Conference 2024 starts in one hour", nullable = true)]
    pub body: Option<String>,
    #[schema(example = "2024-12-20T08:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub read_at: Option<DateTime<Utc>>,
    #[schema(example = "2024-12-19T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
