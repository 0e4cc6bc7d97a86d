use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Publication state of an event. Stored lowercase in the `status` column.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "title": "Tech Conference 2024",
        "description": "Annual technology conference",
        "start_at": "2024-12-20T09:00:00Z",
        "end_at": "2024-12-20T17:00:00Z",
        "location": "Convention Center, Ho Chi Minh City",
        "max_attendees": 500,
        "current_attendees": 150,
        "status": "published",
        "organizer_id": 1,
        "category": "Technology",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
)]
pub struct Event {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Tech Conference 2024")]
    pub title: String,

    #[schema(example = "Annual technology conference", nullable = true)]
    pub description: Option<String>,

    /// Start of the check-in window.
    #[schema(example = "2024-12-20T09:00:00Z", format = "date-time", value_type = String)]
    pub start_at: DateTime<Utc>,

    /// End of the check-in window.
    #[schema(example = "2024-12-20T17:00:00Z", format = "date-time", value_type = String)]
    pub end_at: DateTime<Utc>,

    #[schema(example = "Convention Center", nullable = true)]
    pub location: Option<String>,

    #[schema(example = 500, nullable = true)]
    pub max_attendees: Option<u32>,

    #[schema(example = 150)]
    pub current_attendees: u32,

    #[schema(example = "published")]
    pub status: String,

    #[schema(example = 1)]
    pub organizer_id: u64,

    #[schema(example = "Technology", nullable = true)]
    pub category: Option<String>,

    #[schema(example = "2024-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(example = "2024-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub updated_at: Option<DateTime<Utc>>,
}
