use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    model::event::{Event, EventStatus},
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegistrationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct RegistrationResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub event_id: u64,
    #[schema(example = "Tech Conference 2024")]
    pub event_title: String,
    #[schema(example = "2024-12-20T09:00:00Z", format = "date-time", value_type = String)]
    pub start_at: DateTime<Utc>,
    #[schema(example = "2024-12-20T17:00:00Z", format = "date-time", value_type = String)]
    pub end_at: DateTime<Utc>,
    #[schema(example = "Convention Center", nullable = true)]
    pub location: Option<String>,
    #[schema(example = "2024-12-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct RegistrationListResponse {
    pub data: Vec<RegistrationResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 2)]
    pub total: i64,
}

/// Register for an event
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/register",
    params(
        ("event_id", Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Registered successfully", body = Object, example = json!({
            "message": "Registered successfully"
        })),
        (status = 400, description = "Event not open or full"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Already registered"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registrations"
)]
pub async fn register(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let event_id = path.into_inner();

    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, event_id, "Failed to fetch event");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let event = match event {
        Some(event) => event,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Event not found"
            })))
        }
    };

    if EventStatus::from_str(&event.status).ok() != Some(EventStatus::Published) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Event is not open for registration"
        })));
    }

    if let Some(max) = event.max_attendees {
        if event.current_attendees >= max {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Event is full"
            })));
        }
    }

    let result = sqlx::query("INSERT INTO registrations (event_id, user_id) VALUES (?, ?)")
        .bind(event_id)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => {
            // Keep the denormalized headcount in step (non-fatal)
            if let Err(e) =
                sqlx::query("UPDATE events SET current_attendees = current_attendees + 1 WHERE id = ?")
                    .bind(event_id)
                    .execute(pool.get_ref())
                    .await
            {
                error!(error = %e, event_id, "Failed to bump attendee count");
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Registered successfully"
            })))
        }

        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Already registered for this event"
                    })));
                }
            }

            error!(error = %e, event_id, user_id = auth.user_id, "Registration failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// Cancel an event registration
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}/unregister",
    params(
        ("event_id", Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Unregistered successfully", body = Object, example = json!({
            "message": "Unregistered successfully"
        })),
        (status = 400, description = "Not registered for this event"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registrations"
)]
pub async fn unregister(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let event_id = path.into_inner();

    let result = sqlx::query("DELETE FROM registrations WHERE event_id = ? AND user_id = ?")
        .bind(event_id)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, event_id, user_id = auth.user_id, "Unregister failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Not registered for this event"
        })));
    }

    if let Err(e) = sqlx::query(
        "UPDATE events SET current_attendees = current_attendees - 1 WHERE id = ? AND current_attendees > 0",
    )
    .bind(event_id)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, event_id, "Failed to drop attendee count");
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Unregistered successfully"
    })))
}

/// List the caller's registrations
#[utoipa::path(
    get,
    path = "/api/v1/registrations/my",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated registration list", body = RegistrationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Registrations"
)]
pub async fn my_registrations(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RegistrationQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM registrations WHERE user_id = ?")
        .bind(auth.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count registrations");
            ErrorInternalServerError("Database error")
        })?;

    let registrations = sqlx::query_as::<_, RegistrationResponse>(
        r#"
        SELECT r.id, r.event_id, e.title AS event_title, e.start_at, e.end_at,
               e.location, r.created_at
        FROM registrations r
        JOIN events e ON e.id = r.event_id
        WHERE r.user_id = ?
        ORDER BY r.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(auth.user_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch registrations");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(RegistrationListResponse {
        data: registrations,
        page,
        per_page,
        total,
    }))
}
