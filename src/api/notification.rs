use crate::{auth::auth::AuthUser, model::notification::Notification};
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

/// List the caller's notifications, unread first
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated notification list", body = NotificationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn list_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
        .bind(auth.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count notifications");
            ErrorInternalServerError("Database error")
        })?;

    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, title, body, read_at, created_at
        FROM notifications
        WHERE user_id = ?
        ORDER BY (read_at IS NULL) DESC, created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(auth.user_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch notifications");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(NotificationListResponse {
        data: notifications,
        page,
        per_page,
        total,
    }))
}

/// Mark a notification as read (idempotent)
#[utoipa::path(
    post,
    path = "/api/v1/notifications/{notification_id}/read",
    params(
        ("notification_id", Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked as read", body = Object, example = json!({
            "message": "Notification marked as read"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notifications"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let notification_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET read_at = NOW()
        WHERE id = ?
        AND user_id = ?
        AND read_at IS NULL
        "#,
    )
    .bind(notification_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, notification_id, "Mark-read failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        // Already read, or not this caller's notification
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM notifications WHERE id = ? AND user_id = ? LIMIT 1)",
        )
        .bind(notification_id)
        .bind(auth.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, notification_id, "Notification lookup failed");
            ErrorInternalServerError("Internal Server Error")
        })?;

        if !exists {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Notification not found"
            })));
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Notification marked as read"
    })))
}
