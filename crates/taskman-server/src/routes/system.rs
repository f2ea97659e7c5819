use std::sync::Arc;

use axum::Extension;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use taskman_core::AppError;

use crate::auth::CurrentUser;
use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Greeting", body = String, content_type = "text/plain")),
    tag = "system"
)]
pub async fn welcome() -> &'static str {
    "Welcome to Taskman"
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.store.health_check().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
        backend: state.store.name(),
    };

    (status, axum::Json(response))
}

#[utoipa::path(
    get,
    path = "/api/debug/sentry-message",
    responses(
        (status = 200, description = "Test message sent", body = String, content_type = "text/plain"),
        (status = 403, description = "Administrator role required", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "system"
)]
pub async fn sentry_message(
    Extension(current): Extension<CurrentUser>,
) -> Result<&'static str, ApiError> {
    current.ensure_admin()?;

    sentry::capture_message("Test message from Taskman", sentry::Level::Info);
    tracing::info!(user_id = current.0.id, "Sent Sentry test message");
    Ok("Test message sent")
}

#[utoipa::path(
    get,
    path = "/api/debug/sentry-test",
    responses(
        (status = 200, description = "Test exception sent", body = String, content_type = "text/plain"),
        (status = 403, description = "Administrator role required", body = crate::dto::ErrorResponse),
    ),
    security(("bearer" = [])),
    tag = "system"
)]
pub async fn sentry_test(
    Extension(current): Extension<CurrentUser>,
) -> Result<&'static str, ApiError> {
    current.ensure_admin()?;

    let err = AppError::Generic("Test exception from Taskman".into());
    sentry::capture_error(&err);
    tracing::info!(user_id = current.0.id, "Sent Sentry test exception");
    Ok("Test exception sent")
}
