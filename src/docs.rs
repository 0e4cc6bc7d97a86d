use crate::api::attendance::{AttendanceListResponse, AttendanceQuery, CheckinRequest};
use crate::api::certificate::{
    CertificateListResponse, CertificateQuery, CertificateResponse, IssueCertificate,
};
use crate::api::event::{CreateEvent, EventListResponse, EventQuery};
use crate::api::feedback::{CreateFeedback, FeedbackListResponse, FeedbackQuery, FeedbackResponse};
use crate::api::notification::{NotificationListResponse, NotificationQuery};
use crate::api::registration::{
    RegistrationListResponse, RegistrationQuery, RegistrationResponse,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::event::{Event, EventStatus};
use crate::model::notification::Notification;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{openapi, Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Event Management API",
        version = "1.0.0",
        description = r#"
## Event Management Platform

This API powers an event-management platform: event discovery, registration,
attendance check-in, certificates, notifications and feedback.

### Key Features
- **Events**
  - Browse published events, organizers create and manage their own
- **Registrations**
  - Register for events, cancel, and list your registrations
- **Attendance**
  - Check in with an event code during the event's time window
- **Certificates**
  - Organizers issue certificates, attendees list their own
- **Notifications & Feedback**
  - In-app notifications and per-event feedback

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Event listing and detail are public.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::attendance::check_in,
        crate::api::attendance::attendance_list,

        crate::api::event::list_events,
        crate::api::event::get_event,
        crate::api::event::create_event,
        crate::api::event::update_event,
        crate::api::event::delete_event,

        crate::api::registration::register,
        crate::api::registration::unregister,
        crate::api::registration::my_registrations,

        crate::api::certificate::my_certificates,
        crate::api::certificate::issue_certificate,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,

        crate::api::feedback::create_feedback,
        crate::api::feedback::list_feedback
    ),
    components(
        schemas(
            CheckinRequest,
            AttendanceRecord,
            AttendanceQuery,
            AttendanceListResponse,
            Event,
            EventStatus,
            CreateEvent,
            EventQuery,
            EventListResponse,
            RegistrationQuery,
            RegistrationResponse,
            RegistrationListResponse,
            IssueCertificate,
            CertificateQuery,
            CertificateResponse,
            CertificateListResponse,
            Notification,
            NotificationQuery,
            NotificationListResponse,
            CreateFeedback,
            FeedbackQuery,
            FeedbackResponse,
            FeedbackListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Events", description = "Event management APIs"),
        (name = "Registrations", description = "Event registration APIs"),
        (name = "Attendance", description = "Attendance check-in APIs"),
        (name = "Certificates", description = "Certificate APIs"),
        (name = "Notifications", description = "Notification APIs"),
        (name = "Feedback", description = "Event feedback APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
