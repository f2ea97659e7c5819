use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::dto::{CreateTaskRequest, TaskListQuery, TaskResponse, UpdateTaskRequest};
use crate::error::{ApiError, AppJson, AppPath, AppQuery};
use crate::routes::listed;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/tasks",
    params(TaskListQuery),
    responses(
        (status = 200, description = "Matching tasks; total in X-Total-Count", body = Vec<TaskResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<TaskListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = query.into_parts();
    let result = state.tasks().list(&filter, page).await?;

    let items: Vec<TaskResponse> = result.items.into_iter().map(Into::into).collect();
    Ok(listed(items, result.total))
}

#[utoipa::path(
    get,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn get_task(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.tasks().get(id).await?;
    Ok(axum::Json(TaskResponse::from(task)))
}

#[utoipa::path(
    post,
    path = "/api/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Status, assignee or label not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.tasks().create(body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(TaskResponse::from(task))))
}

#[utoipa::path(
    put,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 404, description = "Task or a referenced row not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateTaskRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.tasks().update(id, body.into()).await?;
    Ok(axum::Json(TaskResponse::from(task)))
}

#[utoipa::path(
    delete,
    path = "/api/tasks/{id}",
    params(("id" = i64, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.tasks().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
