//! Companion REST API for tasks and accounts.
//!
//! Surface:
//! - `POST /users` — register (201)
//! - `POST /sessions/password` — login, returns a JWT
//! - `GET /profile` — authenticated user
//! - `GET|POST /tasks`, `GET|PUT|DELETE /tasks/:id` — per-user task CRUD
//!
//! All bodies are JSON with camelCase fields; errors carry a machine
//! `message` plus a localized `displayMessage`.

pub mod auth;
pub mod db;
pub mod error;
mod routes;

pub use auth::CurrentUser;
pub use db::{Database, Task, User};
pub use error::ApiError;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Environment variable holding the JWT signing secret.
pub const JWT_SECRET_ENV: &str = "WAVE_JWT_SECRET";

/// Fallback secret for local development.
const DEV_JWT_SECRET: &str = "wave-dev-secret";

/// Confirmation body with a machine message and a localized one.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(rename = "displayMessage")]
    pub display_message: String,
}

/// Shared server state.
pub struct AppState {
    /// SQLite connection; rusqlite connections are not Sync, so access is
    /// serialized behind an async mutex.
    pub db: Mutex<Database>,
    /// JWT signing secret
    pub jwt_secret: String,
}

impl AppState {
    /// Creates state around an opened database.
    #[must_use]
    pub fn new(db: Database, jwt_secret: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            db: Mutex::new(db),
            jwt_secret: jwt_secret.into(),
        })
    }
}

/// Builds the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/users", post(routes::auth::register))
        .route("/sessions/password", post(routes::auth::login))
        .route("/profile", get(routes::auth::profile))
        .route(
            "/tasks",
            get(routes::tasks::list).post(routes::tasks::create),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_one)
                .put(routes::tasks::update)
                .delete(routes::tasks::remove),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Opens the database and serves the API until the process is stopped.
pub async fn run(addr: SocketAddr, db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory: {:?}", parent))?;
    }
    let db = Database::open(db_path)
        .with_context(|| format!("failed to open database: {:?}", db_path))?;

    let jwt_secret =
        std::env::var(JWT_SECRET_ENV).unwrap_or_else(|_| DEV_JWT_SECRET.to_string());
    let state = AppState::new(db, jwt_secret);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "task API listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Returns the default database path, `~/.wave/wave.db`.
#[must_use]
pub fn default_db_path() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".wave")
        .join("wave.db")
}
