use crate::{
    api::{attendance, certificate, event, feedback, health, notification, registration},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let public_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.service(web::resource("/health").route(web::get().to(health::health)));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Event routes: reads are public; writes and the registration/feedback
    // sub-resources authenticate through the AuthUser extractor.
    cfg.service(
        web::scope(&format!("{}/events", config.api_prefix))
            .wrap(public_limiter)
            // /events
            .service(
                web::resource("")
                    .route(web::get().to(event::list_events))
                    .route(web::post().to(event::create_event)),
            )
            // /events/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(event::get_event))
                    .route(web::put().to(event::update_event))
                    .route(web::delete().to(event::delete_event)),
            )
            // /events/{id}/register
            .service(
                web::resource("/{id}/register").route(web::post().to(registration::register)),
            )
            // /events/{id}/unregister
            .service(
                web::resource("/{id}/unregister")
                    .route(web::delete().to(registration::unregister)),
            )
            // /events/{id}/feedback
            .service(
                web::resource("/{id}/feedback")
                    .route(web::post().to(feedback::create_feedback))
                    .route(web::get().to(feedback::list_feedback)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/auth/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/registrations")
                    // /registrations/my
                    .service(
                        web::resource("/my").route(web::get().to(registration::my_registrations)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::get().to(attendance::attendance_list)))
                    // /attendance/checkin
                    .service(
                        web::resource("/checkin").route(web::post().to(attendance::check_in)),
                    ),
            )
            .service(
                web::scope("/notifications")
                    // /notifications
                    .service(
                        web::resource("").route(web::get().to(notification::list_notifications)),
                    )
                    // /notifications/{id}/read
                    .service(
                        web::resource("/{id}/read").route(web::post().to(notification::mark_read)),
                    ),
            )
            .service(
                web::scope("/certificates")
                    // /certificates/mine
                    .service(
                        web::resource("/mine").route(web::get().to(certificate::my_certificates)),
                    )
                    // /certificates/issue
                    .service(
                        web::resource("/issue")
                            .route(web::post().to(certificate::issue_certificate)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token
