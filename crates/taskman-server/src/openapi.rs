use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskman API",
        version = "0.1.0",
        description = "Task manager with users, task statuses, labels and tasks."
    ),
    paths(
        crate::routes::auth::login,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::create_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
        crate::routes::task_statuses::list_task_statuses,
        crate::routes::task_statuses::get_task_status,
        crate::routes::task_statuses::create_task_status,
        crate::routes::task_statuses::update_task_status,
        crate::routes::task_statuses::delete_task_status,
        crate::routes::labels::list_labels,
        crate::routes::labels::get_label,
        crate::routes::labels::create_label,
        crate::routes::labels::update_label,
        crate::routes::labels::delete_label,
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::get_task,
        crate::routes::tasks::create_task,
        crate::routes::tasks::update_task,
        crate::routes::tasks::delete_task,
        crate::routes::system::welcome,
        crate::routes::system::health,
        crate::routes::system::sentry_message,
        crate::routes::system::sentry_test,
    ),
    components(schemas(
        crate::dto::LoginRequest,
        crate::dto::UserResponse,
        crate::dto::CreateUserRequest,
        crate::dto::UpdateUserRequest,
        crate::dto::TaskStatusResponse,
        crate::dto::CreateTaskStatusRequest,
        crate::dto::UpdateTaskStatusRequest,
        crate::dto::LabelResponse,
        crate::dto::CreateLabelRequest,
        crate::dto::UpdateLabelRequest,
        crate::dto::TaskResponse,
        crate::dto::CreateTaskRequest,
        crate::dto::UpdateTaskRequest,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Login and token issuing"),
        (name = "users", description = "User accounts"),
        (name = "task_statuses", description = "Task statuses"),
        (name = "labels", description = "Task labels"),
        (name = "tasks", description = "Tasks"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the JWT bearer security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by POST /api/login."))
                        .build(),
                ),
            );
        }
    }
}
