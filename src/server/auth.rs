//! JWT authentication for the task API.
//!
//! Tokens carry the user id in `sub` and expire after seven days. Handlers
//! take a [`CurrentUser`] argument to require a valid bearer token; the
//! extractor rejects missing or invalid tokens with a 401.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::AppState;

/// Token lifetime in days.
const TOKEN_EXPIRY_DAYS: i64 = 7;

/// JWT claims: the user id and the expiry timestamp.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

/// Issues a signed token for a user id.
///
/// # Errors
/// Returns an error if signing fails.
pub fn issue_token(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_EXPIRY_DAYS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies a token and returns its claims.
///
/// # Errors
/// Returns an error for malformed, forged, or expired tokens.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(ApiError::unauthorized)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(ApiError::unauthorized)?;

        let claims =
            verify_token(token, &state.jwt_secret).map_err(|_| ApiError::unauthorized())?;

        Ok(CurrentUser {
            user_id: claims.sub,
        })
    }
}
