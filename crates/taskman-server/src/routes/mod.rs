use std::sync::Arc;

use axum::Router;
use axum::http::HeaderName;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::require_auth;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub mod auth;
pub mod labels;
pub mod system;
pub mod task_statuses;
pub mod tasks;
pub mod users;

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Largest accepted request body; bigger requests get 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the full router with all routes and middleware, including CORS,
/// request tracing and the body size limit.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/users", get(users::list_users))
        .route(
            "/api/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/task_statuses",
            get(task_statuses::list_task_statuses).post(task_statuses::create_task_status),
        )
        .route(
            "/api/task_statuses/{id}",
            get(task_statuses::get_task_status)
                .put(task_statuses::update_task_status)
                .delete(task_statuses::delete_task_status),
        )
        .route(
            "/api/labels",
            get(labels::list_labels).post(labels::create_label),
        )
        .route(
            "/api/labels/{id}",
            get(labels::get_label)
                .put(labels::update_label)
                .delete(labels::delete_label),
        )
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task)
                .put(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/api/debug/sentry-message", get(system::sentry_message))
        .route("/api/debug/sentry-test", get(system::sentry_test))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let public = Router::new()
        .route("/", get(system::welcome))
        .route("/welcome", get(system::welcome))
        .route("/health", get(system::health))
        .route("/api/login", post(auth::login))
        .route("/api/users", post(users::create_user))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public
        .merge(api)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive().expose_headers([TOTAL_COUNT_HEADER]))
}

/// A JSON array response carrying the unpaginated match count in `X-Total-Count`.
pub(crate) fn listed<T: Serialize>(items: Vec<T>, total: u64) -> impl IntoResponse {
    (
        [(TOTAL_COUNT_HEADER, total.to_string())],
        axum::Json(items),
    )
}
