use crate::{
    api::{attendance, student, subject},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Result, anyhow};
use std::sync::Arc;

pub type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
pub fn build_limiter(requests_per_min: u32) -> Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {} per minute", requests_per_min))?;

    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiter: Limiter) {
    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiter) // rate limiting
            .service(
                web::scope("/subjects")
                    // /subjects
                    .service(
                        web::resource("")
                            .route(web::get().to(subject::list_subjects))
                            .route(web::post().to(subject::create_subject)),
                    )
                    // /subjects/{subject_id}
                    .service(
                        web::resource("/{subject_id}")
                            .route(web::get().to(subject::get_subject))
                            .route(web::delete().to(subject::delete_subject)),
                    )
                    // /subjects/{subject_id}/students
                    .service(
                        web::resource("/{subject_id}/students")
                            .route(web::get().to(student::list_students))
                            .route(web::post().to(student::add_student)),
                    )
                    // /subjects/{subject_id}/students/import
                    .service(
                        web::resource("/{subject_id}/students/import")
                            .route(web::post().to(student::import_students)),
                    )
                    // /subjects/{subject_id}/students/{student_id}
                    .service(
                        web::resource("/{subject_id}/students/{student_id}")
                            .route(web::delete().to(student::delete_student)),
                    )
                    // /subjects/{subject_id}/grid
                    .service(
                        web::resource("/{subject_id}/grid")
                            .route(web::get().to(attendance::get_grid)),
                    )
                    // /subjects/{subject_id}/attendance/toggle
                    .service(
                        web::resource("/{subject_id}/attendance/toggle")
                            .route(web::post().to(attendance::toggle_attendance)),
                    )
                    // /subjects/{subject_id}/attendance/{date}
                    .service(
                        web::resource("/{subject_id}/attendance/{date}")
                            .route(web::get().to(attendance::get_day))
                            .route(web::put().to(attendance::save_day)),
                    ),
            ),
    );
}
