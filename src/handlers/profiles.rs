use actix_web::{HttpResponse, Responder, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::reputation as reputation_db;

/// GET /api/profiles/{id}/reputation — public reputation summary
/// (`rating_avg`, `rating_count`, `review_count`). A user who was never
/// rated gets all zeroes rather than a 404.
pub async fn get_reputation(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match reputation_db::get_reputation(db.get_ref(), path.into_inner()).await {
        Ok(reputation) => HttpResponse::Ok().json(reputation),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}

/// GET /api/profiles/{id}/reviews — the append-only review log for one
/// user, newest first.
pub async fn get_reviews(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> impl Responder {
    match reputation_db::list_reviews_for_user(db.get_ref(), path.into_inner()).await {
        Ok(reviews) => HttpResponse::Ok().json(reviews),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": format!("Database error: {e}"),
        })),
    }
}
