pub mod jobs;
pub mod profiles;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Job lifecycle routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/jobs")
            .route("", web::get().to(jobs::list_jobs))
            .route("", web::post().to(jobs::request_hire))
            .route("/{id}", web::get().to(jobs::get_job))
            .route("/{id}/accept", web::post().to(jobs::decide_invitation))
            .route("/{id}/end", web::post().to(jobs::request_end))
            .route("/{id}/respond", web::post().to(jobs::respond)),
    );

    // ── Profile boundary: the reputation read path ──
    cfg.service(
        web::scope("/profiles")
            .route("/{id}/reputation", web::get().to(profiles::get_reputation))
            .route("/{id}/reviews", web::get().to(profiles::get_reviews)),
    );
}
