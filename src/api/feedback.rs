use crate::auth::auth::AuthUser;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateFeedback {
    /// 1 (worst) to 5 (best).
    #[schema(example = 5)]
    pub rating: u8,
    #[schema(example = "Great talks, crowded hallway track", nullable = true)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeedbackQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct FeedbackResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "Jane Doe")]
    pub user_name: String,
    #[schema(example = 5)]
    pub rating: u8,
    #[schema(example = "Great talks", nullable = true)]
    pub comment: Option<String>,
    #[schema(example = "2024-12-21T10:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct FeedbackListResponse {
    pub data: Vec<FeedbackResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 5)]
    pub total: i64,
}

/// Submit feedback for an event
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/feedback",
    params(
        ("event_id", Path, description = "Event ID")
    ),
    request_body = CreateFeedback,
    responses(
        (status = 200, description = "Feedback submitted", body = Object, example = json!({
            "message": "Feedback submitted"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Feedback already submitted"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Feedback"
)]
pub async fn create_feedback(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CreateFeedback>,
) -> actix_web::Result<impl Responder> {
    let event_id = path.into_inner();

    if !(1..=5).contains(&payload.rating) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "rating must be between 1 and 5"
        })));
    }

    let event_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM events WHERE id = ? LIMIT 1)")
            .bind(event_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, event_id, "Failed to check event");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if !event_exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Event not found"
        })));
    }

    let result = sqlx::query(
        "INSERT INTO feedback (event_id, user_id, rating, comment) VALUES (?, ?, ?, ?)",
    )
    .bind(event_id)
    .bind(auth.user_id)
    .bind(payload.rating)
    .bind(&payload.comment)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Feedback submitted"
        }))),

        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Feedback already submitted for this event"
                    })));
                }
            }

            error!(error = %e, event_id, user_id = auth.user_id, "Feedback insert failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}

/// List feedback for an event
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/feedback",
    params(
        ("event_id", Path, description = "Event ID"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated feedback list", body = FeedbackListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Feedback"
)]
pub async fn list_feedback(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<FeedbackQuery>,
) -> actix_web::Result<impl Responder> {
    let event_id = path.into_inner();

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM feedback WHERE event_id = ?")
        .bind(event_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count feedback");
            ErrorInternalServerError("Database error")
        })?;

    let entries = sqlx::query_as::<_, FeedbackResponse>(
        r#"
        SELECT f.id, f.user_id, u.name AS user_name, f.rating, f.comment, f.created_at
        FROM feedback f
        JOIN users u ON u.id = f.user_id
        WHERE f.event_id = ?
        ORDER BY f.created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(event_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch feedback");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(FeedbackListResponse {
        data: entries,
        page,
        per_page,
        total,
    }))
}
