use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation, decode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims of the HS256 JWT issued by the external auth service.
///
/// The `sub` field is the authenticated user's UUID; that id is the actor id
/// threaded explicitly through every engagement operation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The authenticated user's UUID.
    pub sub: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
    /// Issuer of the token.
    pub iss: Option<String>,
    /// User's email, when the auth service includes it.
    pub email: Option<String>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }
}

/// Validate an HS256 JWT against the shared secret and return the decoded
/// claims. Expiry is checked with jsonwebtoken's default leeway.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data: TokenData<Claims>| data.claims)
    .map_err(|e| format!("{e:?}"))
}
