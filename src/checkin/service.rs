use std::collections::BTreeMap;
use std::sync::Arc;

use derive_more::Display;

use crate::model::attendance::AttendanceRecord;

use super::clock::Clock;
use super::store::{AttendanceStore, EventStore, NewAttendance, StoreError};

/// Field-level validation detail, keyed by request field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Runtime policy for the check-in rule set.
///
/// `enforce_time_window` switches the temporal window check; the permissive
/// setting accepts any request with a valid event reference regardless of the
/// current time. `unique_checkin` rejects a second check-in for the same
/// (event, code) pair; left off, repeat scans produce distinct records.
#[derive(Debug, Clone, Copy)]
pub struct CheckinPolicy {
    pub enforce_time_window: bool,
    pub unique_checkin: bool,
}

#[derive(Debug, Display)]
pub enum CheckinError {
    /// Malformed input or a nonexistent event reference.
    #[display(fmt = "validation_failed")]
    Validation(FieldErrors),
    /// Current time outside [start_at, end_at].
    #[display(fmt = "invalid_time_window")]
    OutsideWindow,
    /// Uniqueness policy active and this (event, code) pair already recorded.
    #[display(fmt = "already_checked_in")]
    AlreadyCheckedIn,
    /// Persistence failure; never reported as a business outcome.
    #[display(fmt = "store error: {}", _0)]
    Store(StoreError),
}

#[derive(Debug)]
pub struct CheckinAccepted {
    pub record: AttendanceRecord,
    pub event_title: String,
}

pub struct CheckinService {
    events: Arc<dyn EventStore>,
    attendance: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
    policy: CheckinPolicy,
}

impl CheckinService {
    pub fn new(
        events: Arc<dyn EventStore>,
        attendance: Arc<dyn AttendanceStore>,
        clock: Arc<dyn Clock>,
        policy: CheckinPolicy,
    ) -> Self {
        Self {
            events,
            attendance,
            clock,
            policy,
        }
    }

    /// Validates a check-in request and records attendance.
    ///
    /// Exactly one row is inserted per accepted call; no insert happens on
    /// any rejection path. Input validation (shape plus event existence)
    /// runs before the temporal rule, so a nonexistent-event failure and an
    /// out-of-window failure stay distinguishable to callers.
    pub async fn check_in(
        &self,
        checkin_code: &str,
        event_id: u64,
    ) -> Result<CheckinAccepted, CheckinError> {
        let code = checkin_code.trim();

        let mut errors = FieldErrors::new();
        if code.is_empty() {
            errors
                .entry("checkin_code".to_string())
                .or_default()
                .push("checkin_code is required".to_string());
        }

        // The lookup doubles as the existence precondition.
        let event = self
            .events
            .find_by_id(event_id)
            .await
            .map_err(CheckinError::Store)?;

        if event.is_none() {
            errors
                .entry("event_id".to_string())
                .or_default()
                .push(format!("event {} does not exist", event_id));
        }

        let event = match event {
            Some(event) if errors.is_empty() => event,
            _ => return Err(CheckinError::Validation(errors)),
        };

        let now = self.clock.now();

        // Window inclusive at both ends.
        if self.policy.enforce_time_window && (now < event.start_at || now > event.end_at) {
            return Err(CheckinError::OutsideWindow);
        }

        if self.policy.unique_checkin
            && self
                .attendance
                .exists(event.id, code)
                .await
                .map_err(CheckinError::Store)?
        {
            return Err(CheckinError::AlreadyCheckedIn);
        }

        let record = self
            .attendance
            .insert(NewAttendance {
                event_id: event.id,
                checkin_code: code.to_string(),
                checked_in_at: now,
            })
            .await
            .map_err(|e| match e {
                // A unique index on (event_id, checkin_code) may exist even
                // when the policy flag is off; report it as the same outcome.
                StoreError::Duplicate => CheckinError::AlreadyCheckedIn,
                other => CheckinError::Store(other),
            })?;

        Ok(CheckinAccepted {
            record,
            event_title: event.title,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::checkin::clock::FixedClock;
    use crate::checkin::memory::{event_fixture, MemoryAttendanceStore, MemoryEventStore};

    const STRICT: CheckinPolicy = CheckinPolicy {
        enforce_time_window: true,
        unique_checkin: false,
    };

    const PERMISSIVE: CheckinPolicy = CheckinPolicy {
        enforce_time_window: false,
        unique_checkin: false,
    };

    const UNIQUE: CheckinPolicy = CheckinPolicy {
        enforce_time_window: true,
        unique_checkin: true,
    };

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    /// Service over one event (09:00-17:00, 2024-12-20) with a fixed clock.
    fn service_at(now: &str, policy: CheckinPolicy) -> (CheckinService, Arc<MemoryAttendanceStore>) {
        let events = Arc::new(MemoryEventStore::with_events(vec![event_fixture(
            1,
            "Tech Conference 2024",
            "2024-12-20T09:00:00Z",
            "2024-12-20T17:00:00Z",
        )]));
        let attendance = Arc::new(MemoryAttendanceStore::default());
        let service = CheckinService::new(
            events,
            attendance.clone(),
            Arc::new(FixedClock(ts(now))),
            policy,
        );
        (service, attendance)
    }

    #[tokio::test]
    async fn in_window_checkin_creates_one_record() {
        let (service, attendance) = service_at("2024-12-20T10:00:00Z", STRICT);

        let accepted = service.check_in("ABC123", 1).await.expect("accepted");

        assert_eq!(accepted.event_title, "Tech Conference 2024");
        assert_eq!(accepted.record.event_id, 1);
        assert_eq!(accepted.record.checkin_code, "ABC123");
        assert_eq!(accepted.record.checked_in_at, ts("2024-12-20T10:00:00Z"));
        assert_eq!(attendance.records().len(), 1);
    }

    #[tokio::test]
    async fn before_start_is_rejected_without_write() {
        let (service, attendance) = service_at("2024-12-20T08:00:00Z", STRICT);

        let err = service.check_in("ABC123", 1).await.unwrap_err();

        assert!(matches!(err, CheckinError::OutsideWindow));
        assert!(attendance.records().is_empty());
    }

    #[tokio::test]
    async fn after_end_is_rejected_without_write() {
        let (service, attendance) = service_at("2024-12-20T18:00:00Z", STRICT);

        let err = service.check_in("ABC123", 1).await.unwrap_err();

        assert!(matches!(err, CheckinError::OutsideWindow));
        assert!(attendance.records().is_empty());
    }

    #[tokio::test]
    async fn window_is_inclusive_at_both_ends() {
        let (service, _) = service_at("2024-12-20T09:00:00Z", STRICT);
        assert!(service.check_in("AT-START", 1).await.is_ok());

        let (service, _) = service_at("2024-12-20T17:00:00Z", STRICT);
        assert!(service.check_in("AT-END", 1).await.is_ok());
    }

    #[tokio::test]
    async fn permissive_policy_ignores_the_window() {
        let (service, attendance) = service_at("2024-12-20T08:00:00Z", PERMISSIVE);

        service.check_in("ABC123", 1).await.expect("accepted");

        assert_eq!(attendance.records().len(), 1);
    }

    #[tokio::test]
    async fn unknown_event_fails_validation_before_the_window_check() {
        // Clock is outside the window; the nonexistent event must still be
        // reported as a validation failure, not invalid_time_window.
        let (service, attendance) = service_at("2024-12-20T08:00:00Z", STRICT);

        let err = service.check_in("ABC123", 9999).await.unwrap_err();

        match err {
            CheckinError::Validation(errors) => {
                assert!(errors.contains_key("event_id"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(attendance.records().is_empty());
    }

    #[tokio::test]
    async fn empty_code_fails_validation() {
        let (service, attendance) = service_at("2024-12-20T10:00:00Z", STRICT);

        for code in ["", "   "] {
            let err = service.check_in(code, 1).await.unwrap_err();
            match err {
                CheckinError::Validation(errors) => {
                    assert!(errors.contains_key("checkin_code"));
                }
                other => panic!("expected validation error, got {:?}", other),
            }
        }
        assert!(attendance.records().is_empty());
    }

    #[tokio::test]
    async fn all_failing_fields_are_reported_together() {
        let (service, _) = service_at("2024-12-20T10:00:00Z", STRICT);

        let err = service.check_in("", 9999).await.unwrap_err();

        match err {
            CheckinError::Validation(errors) => {
                assert!(errors.contains_key("checkin_code"));
                assert!(errors.contains_key("event_id"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn repeat_checkin_is_allowed_by_default() {
        // Idempotence is NOT guaranteed: two identical requests produce two
        // distinct records.
        let (service, attendance) = service_at("2024-12-20T10:00:00Z", STRICT);

        let first = service.check_in("ABC123", 1).await.expect("first");
        let second = service.check_in("ABC123", 1).await.expect("second");

        assert_ne!(first.record.id, second.record.id);
        assert_eq!(attendance.records().len(), 2);
    }

    #[tokio::test]
    async fn unique_policy_rejects_repeat_checkin() {
        let (service, attendance) = service_at("2024-12-20T10:00:00Z", UNIQUE);

        service.check_in("ABC123", 1).await.expect("first");
        let err = service.check_in("ABC123", 1).await.unwrap_err();

        assert!(matches!(err, CheckinError::AlreadyCheckedIn));
        assert_eq!(attendance.records().len(), 1);
    }

    #[tokio::test]
    async fn unique_policy_still_allows_distinct_codes() {
        let (service, attendance) = service_at("2024-12-20T10:00:00Z", UNIQUE);

        service.check_in("ABC123", 1).await.expect("first");
        service.check_in("XYZ789", 1).await.expect("second code");

        assert_eq!(attendance.records().len(), 2);
    }

    #[tokio::test]
    async fn code_is_trimmed_before_recording() {
        let (service, attendance) = service_at("2024-12-20T10:00:00Z", STRICT);

        service.check_in("  ABC123  ", 1).await.expect("accepted");

        assert_eq!(attendance.records()[0].checkin_code, "ABC123");
    }
}
