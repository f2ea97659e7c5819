use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::dto::{CreateTaskStatusRequest, TaskStatusResponse, UpdateTaskStatusRequest};
use crate::error::{ApiError, AppJson, AppPath};
use crate::routes::listed;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/task_statuses",
    responses(
        (status = 200, description = "All task statuses; count in X-Total-Count", body = Vec<TaskStatusResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "task_statuses"
)]
pub async fn list_task_statuses(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let statuses: Vec<TaskStatusResponse> = state
        .task_statuses()
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = statuses.len() as u64;
    Ok(listed(statuses, total))
}

#[utoipa::path(
    get,
    path = "/api/task_statuses/{id}",
    params(("id" = i64, Path, description = "Task status ID")),
    responses(
        (status = 200, description = "Task status", body = TaskStatusResponse),
        (status = 404, description = "Task status not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "task_statuses"
)]
pub async fn get_task_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.task_statuses().get(id).await?;
    Ok(axum::Json(TaskStatusResponse::from(status)))
}

#[utoipa::path(
    post,
    path = "/api/task_statuses",
    request_body = CreateTaskStatusRequest,
    responses(
        (status = 201, description = "Task status created", body = TaskStatusResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name or slug already used", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "task_statuses"
)]
pub async fn create_task_status(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateTaskStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.task_statuses().create(body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(TaskStatusResponse::from(status))))
}

#[utoipa::path(
    put,
    path = "/api/task_statuses/{id}",
    params(("id" = i64, Path, description = "Task status ID")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Task status updated", body = TaskStatusResponse),
        (status = 404, description = "Task status not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name or slug already used", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "task_statuses"
)]
pub async fn update_task_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateTaskStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = state.task_statuses().update(id, body.into()).await?;
    Ok(axum::Json(TaskStatusResponse::from(status)))
}

#[utoipa::path(
    delete,
    path = "/api/task_statuses/{id}",
    params(("id" = i64, Path, description = "Task status ID")),
    responses(
        (status = 204, description = "Task status deleted"),
        (status = 404, description = "Task status not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Task status is used by tasks", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "task_statuses"
)]
pub async fn delete_task_status(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.task_statuses().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
