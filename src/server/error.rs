//! API error type for the task server.
//!
//! Every client-facing error carries two strings: `message`, a stable
//! machine-readable sentence, and `displayMessage`, the localized text a
//! client shows the user as-is.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// JSON body of an error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(rename = "displayMessage")]
    pub display_message: String,
}

/// Client-facing API error.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub display_message: String,
}

impl ApiError {
    /// A 400 with a custom message pair.
    pub fn bad_request(message: impl Into<String>, display_message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            display_message: display_message.into(),
        }
    }

    /// Missing or invalid bearer token.
    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized.".to_string(),
            display_message: "Não autorizado.".to_string(),
        }
    }

    /// Task missing or owned by another user. Always the same answer, so
    /// task ids cannot be probed across accounts.
    pub fn task_not_found() -> Self {
        Self::bad_request("Task not found.", "Tarefa não encontrada.")
    }

    /// Login failure; the same answer for unknown e-mail and wrong password.
    pub fn invalid_credentials() -> Self {
        Self::bad_request("Invalid credentials.", "Credenciais inválidas.")
    }

    /// An unexpected server-side failure. The detail is logged, not sent.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!("internal error: {}", detail);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error.".to_string(),
            display_message: "Algo deu errado. Tente novamente.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
            display_message: self.display_message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        Self::internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_not_found_shape() {
        let err = ApiError::task_not_found();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Task not found.");
        assert_eq!(err.display_message, "Tarefa não encontrada.");
    }

    #[test]
    fn test_unauthorized_is_401() {
        let err = ApiError::unauthorized();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_error_body_serializes_display_message() {
        let body = ErrorBody {
            message: "Task not found.".to_string(),
            display_message: "Tarefa não encontrada.".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"displayMessage\""));
        assert!(!json.contains("display_message"));
    }
}
