use std::str::FromStr;

use crate::{
    auth::auth::AuthUser,
    model::event::{Event, EventStatus},
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Columns a PUT /events/{id} payload may touch.
const UPDATABLE_COLUMNS: &[&str] = &[
    "title",
    "description",
    "start_at",
    "end_at",
    "location",
    "max_attendees",
    "category",
    "status",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateEvent {
    #[schema(example = "Tech Conference 2024")]
    pub title: String,
    #[schema(example = "Annual technology conference", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "2024-12-20T09:00:00Z", format = "date-time", value_type = String)]
    pub start_at: DateTime<Utc>,
    #[schema(example = "2024-12-20T17:00:00Z", format = "date-time", value_type = String)]
    pub end_at: DateTime<Utc>,
    #[schema(example = "Convention Center", nullable = true)]
    pub location: Option<String>,
    #[schema(example = 500, nullable = true)]
    pub max_attendees: Option<u32>,
    #[schema(example = "Technology", nullable = true)]
    pub category: Option<String>,
    /// Defaults to `draft` when omitted.
    #[schema(example = "published", nullable = true)]
    pub status: Option<EventStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EventListResponse {
    pub data: Vec<Event>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 4)]
    pub total: i64,
}
/// List events (public)
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("status", Query, description = "Filter by status"),
        ("category", Query, description = "Filter by category"),
        ("search", Query, description = "Search by title or description")
    ),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse)
    ),
    tag = "Events"
)]
pub async fn list_events(
    pool: web::Data<MySqlPool>,
    query: web::Query<EventQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        args.push(status.clone());
    }

    if let Some(category) = &query.category {
        conditions.push("category = ?");
        args.push(category.clone());
    }

    if let Some(search) = &query.search {
        conditions.push("(title LIKE ? OR description LIKE ?)");
        let like = format!("%{}%", search);
        args.push(like.clone());
        args.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM events {}", where_clause);
    debug!(sql = %count_sql, "Counting events");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_query = count_query.bind(arg);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count events");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM events {} ORDER BY start_at ASC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching events");

    let mut data_query = sqlx::query_as::<_, Event>(&data_sql);
    for arg in args {
        data_query = data_query.bind(arg);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let events = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch events");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EventListResponse {
        data: events,
        page,
        per_page,
        total,
    }))
}

/// Get event by ID (public)
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}",
    params(
        ("event_id", Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 404, description = "Event not found", body = Object, example = json!({
            "message": "Event not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Events"
)]
pub async fn get_event(
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

    match event {
        Some(event) => Ok(HttpResponse::Ok().json(event)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Event not found"
        }))),
    }
}

/// Create event (organizer/admin)
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEvent,
    responses(
        (status = 200, description = "Event created successfully", body = Object, example = json!({
            "message": "Event created",
            "id": 1
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Events"
)]
pub async fn create_event(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEvent>,
) -> actix_web::Result<impl Responder> {
    auth.require_organizer_or_admin()?;

    if payload.title.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "title must not be empty"
        })));
    }

    if payload.start_at >= payload.end_at {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_at must be before end_at"
        })));
    }

    let status = payload.status.unwrap_or(EventStatus::Draft);

    let result = sqlx::query(
        r#"
        INSERT INTO events
            (title, description, start_at, end_at, location, max_attendees, status, organizer_id, category)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.description)
    .bind(payload.start_at)
    .bind(payload.end_at)
    .bind(&payload.location)
    .bind(payload.max_attendees)
    .bind(status.to_string())
    .bind(auth.user_id)
    .bind(&payload.category)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, organizer_id = auth.user_id, "Failed to create event");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Event created",
        "id": result.last_insert_id()
    })))
}

/// Update event (organizer/admin)
#[utoipa::path(
    put,
    path = "/api/v1/events/{event_id}",
    params(
        ("event_id", Path, description = "Event ID")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Event updated successfully"),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Events"
)]
pub async fn update_event(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_organizer_or_admin()?;

    let event_id = path.into_inner();

    // Reject unknown statuses before they reach the database.
    if let Some(status) = body.get("status").and_then(Value::as_str) {
        if EventStatus::from_str(status).is_err() {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid status. Allowed: draft, published, cancelled, completed"
            })));
        }
    }

    let update = build_update_sql("events", &body, UPDATABLE_COLUMNS, "id", event_id)?;

    let affected = execute_update(pool.get_ref(), update)
        .await
        .map_err(|e| {
            error!(error = %e, event_id, "Failed to update event");
            ErrorInternalServerError("Internal Server Error")
        })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Event not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Event updated successfully"
    })))
}

/// Delete event (organizer/admin)
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    params(
        ("event_id", Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Events"
)]
pub async fn delete_event(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_organizer_or_admin()?;

    let event_id = path.into_inner();

    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(event_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Event not found"
                })));
            }

            Ok(HttpResponse::Ok().json(json!({
                "message": "Successfully deleted"
            })))
        }

        Err(e) => {
            error!(error = %e, event_id, "Failed to delete event");

            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}
