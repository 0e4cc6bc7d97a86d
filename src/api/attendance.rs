use crate::checkin::service::{CheckinError, CheckinService, FieldErrors};
use crate::model::attendance::AttendanceRecord;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CheckinRequest {
    /// Opaque code presented at the door.
    #[schema(example = "ABC123")]
    pub checkin_code: Option<String>,
    #[schema(example = 1)]
    pub event_id: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceQuery {
    pub event_id: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/checkin",
    request_body(
        content = CheckinRequest,
        description = "Check-in payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "success": true,
            "message": "Check-in successful!",
            "data": {
                "attendance_id": 1,
                "event_id": 1,
                "event_title": "Tech Conference 2024",
                "checked_in_at": "2024-12-20T10:00:00Z",
                "checkin_code": "ABC123"
            }
        })),
        (status = 422, description = "Validation failed or outside the check-in window", body = Object, example = json!({
            "message": "invalid_time_window"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    service: web::Data<CheckinService>,
    payload: web::Json<CheckinRequest>,
) -> actix_web::Result<impl Responder> {
    let code = payload.checkin_code.as_deref().unwrap_or("");

    let event_id = match payload.event_id {
        Some(id) => id,
        None => {
            let mut errors = FieldErrors::new();
            if code.trim().is_empty() {
                errors
                    .entry("checkin_code".to_string())
                    .or_default()
                    .push("checkin_code is required".to_string());
            }
            errors
                .entry("event_id".to_string())
                .or_default()
                .push("event_id is required".to_string());
            return Ok(validation_response(errors));
        }
    };

    match service.check_in(code, event_id).await {
        Ok(accepted) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Check-in successful!",
            "data": {
                "attendance_id": accepted.record.id,
                "event_id": accepted.record.event_id,
                "event_title": accepted.event_title,
                "checked_in_at": accepted.record.checked_in_at,
                "checkin_code": accepted.record.checkin_code,
            }
        }))),

        Err(CheckinError::Validation(errors)) => Ok(validation_response(errors)),

        Err(CheckinError::OutsideWindow) => {
            Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "message": "invalid_time_window"
            })))
        }

        Err(CheckinError::AlreadyCheckedIn) => {
            Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "message": "already_checked_in"
            })))
        }

        Err(CheckinError::Store(e)) => {
            error!(error = %e, event_id, "Check-in failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

fn validation_response(errors: FieldErrors) -> HttpResponse {
    HttpResponse::UnprocessableEntity().json(serde_json::json!({
        "message": "validation_failed",
        "errors": errors,
    }))
}

/// Attendance listing endpoint
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(
        ("event_id", Query, description = "Filter by event"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let where_clause = if query.event_id.is_some() {
        "WHERE event_id = ?"
    } else {
        ""
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM attendance {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(event_id) = query.event_id {
        count_query = count_query.bind(event_id);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count attendance records");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT id, event_id, checkin_code, checked_in_at, created_at, updated_at
        FROM attendance
        {}
        ORDER BY checked_in_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, "Fetching attendance records");

    let mut data_query = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    if let Some(event_id) = query.event_id {
        data_query = data_query.bind(event_id);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let records = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch attendance records");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page,
        per_page,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    use super::*;
    use crate::checkin::clock::FixedClock;
    use crate::checkin::memory::{event_fixture, MemoryAttendanceStore, MemoryEventStore};
    use crate::checkin::service::CheckinPolicy;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .expect("valid timestamp")
            .with_timezone(&Utc)
    }

    fn checkin_service(now: &str, enforce_time_window: bool) -> CheckinService {
        CheckinService::new(
            Arc::new(MemoryEventStore::with_events(vec![event_fixture(
                1,
                "Tech Conference 2024",
                "2024-12-20T09:00:00Z",
                "2024-12-20T17:00:00Z",
            )])),
            Arc::new(MemoryAttendanceStore::default()),
            Arc::new(FixedClock(ts(now))),
            CheckinPolicy {
                enforce_time_window,
                unique_checkin: false,
            },
        )
    }

    async fn post_checkin(
        service: CheckinService,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(service))
                .route("/attendance/checkin", web::post().to(check_in)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/attendance/checkin")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn accepted_checkin_returns_the_envelope() {
        let service = checkin_service("2024-12-20T10:00:00Z", true);

        let (status, body) = post_checkin(
            service,
            json!({"checkin_code": "ABC123", "event_id": 1}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Check-in successful!"));
        assert_eq!(body["data"]["attendance_id"], json!(1));
        assert_eq!(body["data"]["event_id"], json!(1));
        assert_eq!(body["data"]["event_title"], json!("Tech Conference 2024"));
        assert_eq!(body["data"]["checkin_code"], json!("ABC123"));
    }

    #[actix_web::test]
    async fn out_of_window_checkin_is_422() {
        let service = checkin_service("2024-12-20T08:00:00Z", true);

        let (status, body) = post_checkin(
            service,
            json!({"checkin_code": "ABC123", "event_id": 1}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], json!("invalid_time_window"));
    }

    #[actix_web::test]
    async fn out_of_window_is_accepted_when_enforcement_is_off() {
        let service = checkin_service("2024-12-20T08:00:00Z", false);

        let (status, body) = post_checkin(
            service,
            json!({"checkin_code": "ABC123", "event_id": 1}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
    }

    #[actix_web::test]
    async fn missing_fields_produce_a_field_error_map() {
        let service = checkin_service("2024-12-20T10:00:00Z", true);

        let (status, body) = post_checkin(service, json!({})).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], json!("validation_failed"));
        assert!(body["errors"]["checkin_code"].is_array());
        assert!(body["errors"]["event_id"].is_array());
    }

    #[actix_web::test]
    async fn unknown_event_produces_a_field_error() {
        let service = checkin_service("2024-12-20T10:00:00Z", true);

        let (status, body) = post_checkin(
            service,
            json!({"checkin_code": "ABC123", "event_id": 9999}),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], json!("validation_failed"));
        assert!(body["errors"]["event_id"].is_array());
    }
}
