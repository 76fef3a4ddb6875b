use actix_web::FromRequest;
use actix_web::{Error, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};
use uuid::Uuid;

use crate::auth::jwt;

/// The actor behind the current request, extracted from a validated JWT.
///
/// Engagement operations always take this explicit actor id — identity is
/// never read from ambient state.
pub struct AuthenticatedUser(pub Uuid);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    // 1. Extract the Bearer token from the Authorization header.
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| actix_web::error::ErrorUnauthorized("Missing Authorization header"))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        actix_web::error::ErrorUnauthorized("Authorization header must be: Bearer <token>")
    })?;

    // 2. Validate against the shared HS256 secret.
    let secret = req
        .app_data::<web::Data<JwtSecret>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("JWT secret not configured"))?;

    let claims = jwt::validate_token(token, &secret.0)
        .map_err(|e| actix_web::error::ErrorUnauthorized(format!("Invalid token: {e}")))?;

    // 3. The `sub` claim carries the actor id.
    let user_id = claims.user_id().map_err(actix_web::error::ErrorUnauthorized)?;

    Ok(AuthenticatedUser(user_id))
}

/// Wrapper type to store the JWT secret in Actix app data.
#[derive(Clone)]
pub struct JwtSecret(pub String);
