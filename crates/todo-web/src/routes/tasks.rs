//! Task route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use todo_core::{TaskList, TaskPatch};

use super::{api_error, ApiError};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub updated_values: TaskPatch,
}

pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<TaskList>, ApiError> {
    let tasks = state.tasks.list().await.map_err(api_error)?;
    Ok(Json(TaskList { tasks }))
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let id = state
        .tasks
        .create(&req.title, &req.description)
        .await
        .map_err(api_error)?;

    state.notifier.notify_in_background();

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Task Created", "id": id })),
    ))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Value>, ApiError> {
    let updated = state
        .tasks
        .update(&id, req.updated_values)
        .await
        .map_err(api_error)?;

    state.notifier.notify_in_background();

    Ok(Json(json!({
        "message": format!("Task with id {id} updated"),
        "updatedValues": updated,
    })))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.tasks.delete(&id).await.map_err(api_error)?;

    state.notifier.notify_in_background();

    Ok(Json(json!({ "message": format!("Task with id {id} deleted") })))
}
