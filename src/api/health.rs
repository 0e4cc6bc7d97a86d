use actix_web::{HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "status": "ok",
            "timestamp": "2024-12-20T10:00:00Z",
            "message": "API is working!"
        }))
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now(),
        "message": "API is working!"
    }))
}
