//! Account endpoints: registration, login, profile.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::auth::{issue_token, CurrentUser};
use crate::server::error::ApiError;
use crate::server::{AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: ProfileUser,
}

/// `POST /users` — creates an account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let name = body.name.trim();
    if name.chars().count() < 2 {
        return Err(ApiError::bad_request(
            "Name must be at least 2 characters.",
            "O nome deve ter pelo menos 2 caracteres.",
        ));
    }
    if !is_valid_email(&body.email) {
        return Err(ApiError::bad_request(
            "Invalid e-mail.",
            "E-mail inválido.",
        ));
    }
    if body.password.chars().count() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters.",
            "A senha deve ter pelo menos 6 caracteres.",
        ));
    }

    let db = state.db.lock().await;
    if db.find_user_by_email(&body.email)?.is_some() {
        return Err(ApiError::bad_request(
            "E-mail already registered.",
            "E-mail já cadastrado.",
        ));
    }

    let hash = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST).map_err(ApiError::internal)?;
    db.create_user(name, &body.email, &hash)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created.".to_string(),
            display_message: "Conta criada com sucesso.".to_string(),
        }),
    ))
}

/// `POST /sessions/password` — exchanges credentials for a bearer token.
///
/// Unknown e-mail and wrong password get the same answer.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = {
        let db = state.db.lock().await;
        db.find_user_by_email(&body.email)?
    }
    .ok_or_else(ApiError::invalid_credentials)?;

    let matches =
        bcrypt::verify(&body.password, &user.password_hash).map_err(ApiError::internal)?;
    if !matches {
        return Err(ApiError::invalid_credentials());
    }

    let token = issue_token(&user.id, &state.jwt_secret).map_err(ApiError::internal)?;
    Ok(Json(TokenResponse { token }))
}

/// `GET /profile` — returns the authenticated user.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let db = state.db.lock().await;
    let user = db
        .find_user_by_id(&current.user_id)?
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Json(ProfileResponse {
        user: ProfileUser {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
