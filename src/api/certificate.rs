use crate::auth::auth::AuthUser;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct IssueCertificate {
    #[schema(example = 1)]
    pub event_id: u64,
    #[schema(example = 42)]
    pub user_id: u64,
    /// Where the rendered document lives; generation itself is external.
    #[schema(example = "https://example.com/certificates/cert-001.pdf", nullable = true)]
    pub pdf_url: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CertificateQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CertificateResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub event_id: u64,
    #[schema(example = "Tech Conference 2024")]
    pub event_title: String,
    #[schema(example = "CERT-0b946c41-66a8-44d5-91b5-6c6cf3b2d1f0")]
    pub certificate_no: String,
    #[schema(example = "https://example.com/certificates/cert-001.pdf", nullable = true)]
    pub pdf_url: Option<String>,
    #[schema(example = "2024-12-21T10:30:00Z", format = "date-time", value_type = String)]
    pub issued_on: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct CertificateListResponse {
    pub data: Vec<CertificateResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 2)]
    pub total: i64,
}

/// List the caller's certificates
#[utoipa::path(
    get,
    path = "/api/v1/certificates/mine",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated certificate list", body = CertificateListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Certificates"
)]
pub async fn my_certificates(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CertificateQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM certificates WHERE user_id = ?")
        .bind(auth.user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count certificates");
            ErrorInternalServerError("Database error")
        })?;

    let certificates = sqlx::query_as::<_, CertificateResponse>(
        r#"
        SELECT c.id, c.event_id, e.title AS event_title, c.certificate_no,
               c.pdf_url, c.issued_on
        FROM certificates c
        JOIN events e ON e.id = c.event_id
        WHERE c.user_id = ?
        ORDER BY c.issued_on DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(auth.user_id)
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch certificates");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(CertificateListResponse {
        data: certificates,
        page,
        per_page,
        total,
    }))
}

/// Issue a certificate (organizer/admin)
#[utoipa::path(
    post,
    path = "/api/v1/certificates/issue",
    request_body = IssueCertificate,
    responses(
        (status = 200, description = "Certificate issued", body = Object, example = json!({
            "message": "Certificate issued",
            "certificate_no": "CERT-0b946c41-66a8-44d5-91b5-6c6cf3b2d1f0"
        })),
        (status = 400, description = "Event not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Already issued"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Certificates"
)]
pub async fn issue_certificate(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<IssueCertificate>,
) -> actix_web::Result<impl Responder> {
    auth.require_organizer_or_admin()?;

    let event_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM events WHERE id = ? LIMIT 1)")
            .bind(payload.event_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, event_id = payload.event_id, "Failed to check event");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if !event_exists {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Event not found"
        })));
    }

    let certificate_no = format!("CERT-{}", Uuid::new_v4());

    let result = sqlx::query(
        r#"
        INSERT INTO certificates (event_id, user_id, certificate_no, pdf_url)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.event_id)
    .bind(payload.user_id)
    .bind(&certificate_no)
    .bind(&payload.pdf_url)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Certificate issued",
            "certificate_no": certificate_no
        }))),

        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Certificate already issued for this attendee"
                    })));
                }
            }

            error!(error = %e, event_id = payload.event_id, "Certificate issue failed");
            Err(ErrorInternalServerError("Internal Server Error"))
        }
    }
}
