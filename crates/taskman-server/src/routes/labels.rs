use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::dto::{CreateLabelRequest, LabelResponse, UpdateLabelRequest};
use crate::error::{ApiError, AppJson, AppPath};
use crate::routes::listed;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/labels",
    responses(
        (status = 200, description = "All labels; count in X-Total-Count", body = Vec<LabelResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "labels"
)]
pub async fn list_labels(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let labels: Vec<LabelResponse> = state
        .labels()
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let total = labels.len() as u64;
    Ok(listed(labels, total))
}

#[utoipa::path(
    get,
    path = "/api/labels/{id}",
    params(("id" = i64, Path, description = "Label ID")),
    responses(
        (status = 200, description = "Label", body = LabelResponse),
        (status = 404, description = "Label not found", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "labels"
)]
pub async fn get_label(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let label = state.labels().get(id).await?;
    Ok(axum::Json(LabelResponse::from(label)))
}

#[utoipa::path(
    post,
    path = "/api/labels",
    request_body = CreateLabelRequest,
    responses(
        (status = 201, description = "Label created", body = LabelResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "labels"
)]
pub async fn create_label(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateLabelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let label = state.labels().create(body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(LabelResponse::from(label))))
}

#[utoipa::path(
    put,
    path = "/api/labels/{id}",
    params(("id" = i64, Path, description = "Label ID")),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Label updated", body = LabelResponse),
        (status = 404, description = "Label not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "labels"
)]
pub async fn update_label(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateLabelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let label = state.labels().update(id, body.into()).await?;
    Ok(axum::Json(LabelResponse::from(label)))
}

#[utoipa::path(
    delete,
    path = "/api/labels/{id}",
    params(("id" = i64, Path, description = "Label ID")),
    responses(
        (status = 204, description = "Label deleted"),
        (status = 404, description = "Label not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "Label is attached to tasks", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "labels"
)]
pub async fn delete_label(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.labels().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
