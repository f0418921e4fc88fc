//! Task CRUD endpoints.
//!
//! Every handler requires a bearer token and only ever touches the
//! caller's rows. A task that does not exist and a task owned by someone
//! else are indistinguishable to the client.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::auth::CurrentUser;
use crate::server::db::Task;
use crate::server::error::ApiError;
use crate::server::{AppState, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct TaskBody {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// `GET /tasks` — lists the caller's tasks, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<TaskListResponse>, ApiError> {
    let db = state.db.lock().await;
    let tasks = db.list_tasks(&current.user_id)?;
    Ok(Json(TaskListResponse { tasks }))
}

/// `POST /tasks` — creates a task for the caller.
pub async fn create(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Json(body): Json<TaskBody>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let name = validated_name(&body.name)?;

    let db = state.db.lock().await;
    let task = db.create_task(&current.user_id, name)?;
    Ok((StatusCode::CREATED, Json(TaskResponse { task })))
}

/// `GET /tasks/:id` — fetches one of the caller's tasks.
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let db = state.db.lock().await;
    let task = owned_task(&db, &id, &current.user_id)?;
    Ok(Json(TaskResponse { task }))
}

/// `PUT /tasks/:id` — renames one of the caller's tasks.
pub async fn update(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<TaskBody>,
) -> Result<Json<TaskResponse>, ApiError> {
    let name = validated_name(&body.name)?;

    let db = state.db.lock().await;
    owned_task(&db, &id, &current.user_id)?;
    let task = db.update_task(&id, name)?.ok_or_else(ApiError::task_not_found)?;
    Ok(Json(TaskResponse { task }))
}

/// `DELETE /tasks/:id` — deletes one of the caller's tasks.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let db = state.db.lock().await;
    owned_task(&db, &id, &current.user_id)?;
    db.delete_task(&id)?;

    Ok(Json(MessageResponse {
        message: "Task deleted.".to_string(),
        display_message: "Tarefa excluída.".to_string(),
    }))
}

fn validated_name(raw: &str) -> Result<&str, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request(
            "Task name is required.",
            "O nome da tarefa é obrigatório.",
        ));
    }
    Ok(name)
}

fn owned_task(
    db: &crate::server::db::Database,
    id: &str,
    user_id: &str,
) -> Result<Task, ApiError> {
    match db.find_task(id)? {
        Some(task) if task.user_id == user_id => Ok(task),
        _ => Err(ApiError::task_not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_name_trims() {
        assert_eq!(validated_name("  Deep work  ").unwrap(), "Deep work");
    }

    #[test]
    fn test_validated_name_rejects_blank() {
        assert!(validated_name("").is_err());
        assert!(validated_name("   ").is_err());
    }
}
