//! In-memory store implementations backing the check-in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::model::attendance::AttendanceRecord;
use crate::model::event::Event;

use super::store::{AttendanceStore, EventStore, NewAttendance, StoreError};

pub fn event_fixture(id: u64, title: &str, start: &str, end: &str) -> Event {
    let parse = |s: &str| {
        DateTime::parse_from_rfc3339(s)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    };

    Event {
        id,
        title: title.to_string(),
        description: None,
        start_at: parse(start),
        end_at: parse(end),
        location: None,
        max_attendees: Some(500),
        current_attendees: 0,
        status: "published".to_string(),
        organizer_id: 1,
        category: None,
        created_at: None,
        updated_at: None,
    }
}

#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<HashMap<u64, Event>>,
}

impl MemoryEventStore {
    pub fn with_events(events: Vec<Event>) -> Self {
        let map = events.into_iter().map(|e| (e.id, e)).collect();
        Self {
            events: Mutex::new(map),
        }
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<Event>, StoreError> {
        Ok(self.events.lock().unwrap().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryAttendanceStore {
    rows: Mutex<Vec<AttendanceRecord>>,
}

impl MemoryAttendanceStore {
    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn exists(&self, event_id: u64, checkin_code: &str) -> Result<bool, StoreError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .any(|r| r.event_id == event_id && r.checkin_code == checkin_code))
    }

    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let record = AttendanceRecord {
            id: rows.len() as u64 + 1,
            event_id: new.event_id,
            checkin_code: new.checkin_code,
            checked_in_at: new.checked_in_at,
            created_at: Some(new.checked_in_at),
            updated_at: Some(new.checked_in_at),
        };
        rows.push(record.clone());
        Ok(record)
    }
}
