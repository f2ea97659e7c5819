use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::auth::CurrentUser;
use crate::dto::{CreateUserRequest, UpdateUserRequest, UserListQuery, UserResponse};
use crate::error::{ApiError, AppJson, AppPath, AppQuery};
use crate::routes::listed;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Matching users; total in X-Total-Count", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = query.into_parts();
    let result = state.users().list(&filter, page).await?;

    let items: Vec<UserResponse> = result.items.into_iter().map(Into::into).collect();
    Ok(listed(items, result.total))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users().get(id).await?;
    Ok(axum::Json(UserResponse::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 409, description = "E-mail already registered", body = crate::dto::ErrorResponse),
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users().create(body.into()).await?;
    Ok((StatusCode::CREATED, axum::Json(UserResponse::from(user))))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid input", body = crate::dto::ErrorResponse),
        (status = 403, description = "Not an admin and not the same user", body = crate::dto::ErrorResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "E-mail already registered", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.ensure_can_manage(id)?;
    let user = state.users().update(id, body.into()).await?;
    Ok(axum::Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not an admin and not the same user", body = crate::dto::ErrorResponse),
        (status = 404, description = "User not found", body = crate::dto::ErrorResponse),
        (status = 409, description = "User is assigned to tasks", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    current.ensure_can_manage(id)?;
    state.users().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
