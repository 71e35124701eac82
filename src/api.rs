//! HTTP API endpoints for tasks.
//!
//! Every successful mutation is announced to connected WebSocket clients, and
//! only after the store has accepted it.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;
use crate::types::{NewTask, StatusUpdate, Task};

/// Errors returned by the task endpoints as `{"error": "..."}`
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),

    #[error("{0}")]
    NotFound(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Create a task.
///
/// POST /tasks
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(new_task) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected task body");
        ApiError::BadRequest("Invalid request")
    })?;

    let task = state.create_task(new_task).await;
    tracing::info!(task_id = %task.id, "Task created");

    state
        .hub
        .broadcast(&format!("New task created: {}", task.title))
        .await;

    Ok((StatusCode::CREATED, Json(json!({ "task_id": task.id }))))
}

/// List all tasks.
///
/// GET /tasks
pub async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<Vec<Task>> {
    Json(state.list_tasks().await)
}

/// Update a task's status.
///
/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // ULIDs parse case-insensitively; stored ids are canonical uppercase
    let task_id = ulid::Ulid::from_string(&raw_id)
        .map_err(|_| ApiError::BadRequest("Invalid task ID"))?
        .to_string();

    let Json(update) = payload.map_err(|_| ApiError::BadRequest("Invalid request body"))?;

    state
        .update_task_status(&task_id, update.status)
        .await
        .ok_or(ApiError::NotFound("Task not found"))?;
    tracing::info!(task_id = %task_id, "Task updated");

    state
        .hub
        .broadcast(&format!("Task updated: {}", task_id))
        .await;

    Ok(Json(json!({ "message": "Task updated successfully" })))
}
