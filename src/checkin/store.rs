use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use sqlx::MySqlPool;

use crate::model::attendance::AttendanceRecord;
use crate::model::event::Event;

/// Store-level failure. `Duplicate` is split out so a unique-index violation
/// on (event_id, checkin_code) can surface as a check-in outcome instead of
/// an internal error.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "duplicate key")]
    Duplicate,
    #[display(fmt = "{}", _0)]
    Backend(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // MySQL integrity constraint violation
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Duplicate;
            }
        }
        StoreError::Backend(e)
    }
}

/// Row to insert. Identifier and row timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub event_id: u64,
    pub checkin_code: String,
    pub checked_in_at: DateTime<Utc>,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<Event>, StoreError>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn exists(&self, event_id: u64, checkin_code: &str) -> Result<bool, StoreError>;
    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, StoreError>;
}

pub struct MySqlEventStore {
    pool: MySqlPool,
}

impl MySqlEventStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for MySqlEventStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, title, description, start_at, end_at, location,
                   max_attendees, current_attendees, status, organizer_id,
                   category, created_at, updated_at
            FROM events
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn exists(&self, event_id: u64, checkin_code: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM attendance WHERE event_id = ? AND checkin_code = ? LIMIT 1)",
        )
        .bind(event_id)
        .bind(checkin_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            "INSERT INTO attendance (event_id, checkin_code, checked_in_at) VALUES (?, ?, ?)",
        )
        .bind(new.event_id)
        .bind(&new.checkin_code)
        .bind(new.checked_in_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();

        // Read back so the caller gets the row timestamps the database assigned.
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, event_id, checkin_code, checked_in_at, created_at, updated_at
            FROM attendance
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }
}
