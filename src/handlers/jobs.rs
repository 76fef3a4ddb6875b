use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::engagement;
use crate::error::EngagementError;
use crate::models::JobListQuery;
use crate::models::jobs::{EndJobRequest, HireRequest, InvitationDecision, RespondRequest};

/// Map a core error onto the HTTP surface. Every rejected operation left all
/// state exactly as it was, so surfacing the message is always safe.
fn error_response(err: &EngagementError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        EngagementError::NotFound(_) => HttpResponse::NotFound().json(body),
        EngagementError::Forbidden(_) => HttpResponse::Forbidden().json(body),
        EngagementError::InvalidState(_) | EngagementError::Validation(_) => {
            HttpResponse::BadRequest().json(body)
        }
        EngagementError::ProviderUnavailable(_) | EngagementError::ConcurrentUpdateConflict(_) => {
            HttpResponse::Conflict().json(body)
        }
        EngagementError::Db(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// POST /api/jobs — a client sends a hire request to one pre-selected
/// provider. The client id comes from the JWT; the provider must currently
/// be available.
pub async fn request_hire(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<HireRequest>,
) -> impl Responder {
    match engagement::request_hire(db.get_ref(), user.0, body.into_inner()).await {
        Ok(job) => HttpResponse::Created().json(job),
        Err(e) => error_response(&e),
    }
}

/// GET /api/jobs — list jobs where the caller is a participant, optionally
/// filtered by role (`?role=client|provider`) and status
/// (`?status=closed,disputed`), sorted by last update descending.
pub async fn list_jobs(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<JobListQuery>,
) -> impl Responder {
    let query = query.into_inner();

    match engagement::list_jobs(db.get_ref(), user.0, query.role(), query.statuses()).await {
        Ok(jobs) => HttpResponse::Ok().json(jobs),
        Err(e) => error_response(&e),
    }
}

/// GET /api/jobs/{id} — single job, participants only.
pub async fn get_job(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match engagement::get_job(db.get_ref(), path.into_inner(), user.0).await {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => error_response(&e),
    }
}

/// POST /api/jobs/{id}/accept — the hired provider accepts or refuses the
/// invitation.
pub async fn decide_invitation(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<InvitationDecision>,
) -> impl Responder {
    match engagement::decide_invitation(db.get_ref(), path.into_inner(), user.0, body.action).await
    {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => error_response(&e),
    }
}

/// POST /api/jobs/{id}/end — either participant proposes ending the job,
/// with an optional provisional rating/comment for the other side.
pub async fn request_end(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<EndJobRequest>,
) -> impl Responder {
    match engagement::request_end(db.get_ref(), path.into_inner(), user.0, body.into_inner()).await
    {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => error_response(&e),
    }
}

/// POST /api/jobs/{id}/respond — the counterparty accepts (closing the job
/// and settling reputation), rejects with a counter-offer, or escalates into
/// a dispute.
pub async fn respond(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<RespondRequest>,
) -> impl Responder {
    match engagement::respond(db.get_ref(), path.into_inner(), user.0, body.into_inner()).await {
        Ok(job) => HttpResponse::Ok().json(job),
        Err(e) => error_response(&e),
    }
}
