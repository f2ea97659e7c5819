use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use taskman_core::filter::{Pagination, TaskFilter, UserFilter};
use taskman_core::models::{
    CreateTask, CreateUser, Label, LabelUpdate, NewLabel, NewTaskStatus, Role, Task, TaskStatus,
    TaskStatusUpdate, TaskUpdate, User, UserUpdate,
};
use taskman_core::patch::Patch;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Account e-mail
    #[schema(example = "hexlet@example.com")]
    pub username: String,
    #[schema(example = "qwerty")]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: NaiveDate,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at.date_naive(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// At least 3 characters
    pub password: String,
}

impl From<CreateUserRequest> for CreateUser {
    /// Self-registration always yields a regular user.
    fn from(req: CreateUserRequest) -> Self {
        CreateUser {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password: req.password,
            role: Role::User,
        }
    }
}

/// Partial update: omitted fields are left unchanged, `null` clears optional ones.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub first_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub last_name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub password: Patch<String>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        UserUpdate {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub id: Option<i64>,
    pub email: Option<String>,
    /// Case-insensitive substring of the e-mail
    pub email_cont: Option<String>,
    pub first_name: Option<String>,
    pub first_name_cont: Option<String>,
    pub last_name: Option<String>,
    pub last_name_cont: Option<String>,
    /// Registration day, `yyyy-MM-dd`
    pub created_at: Option<NaiveDate>,
    pub created_at_gt: Option<NaiveDate>,
    pub created_at_lt: Option<NaiveDate>,
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 10, max 100)
    pub size: Option<u32>,
}

impl UserListQuery {
    pub fn into_parts(self) -> (UserFilter, Pagination) {
        let filter = UserFilter {
            id: self.id,
            email: self.email,
            email_cont: self.email_cont,
            first_name: self.first_name,
            first_name_cont: self.first_name_cont,
            last_name: self.last_name,
            last_name_cont: self.last_name_cont,
            created_at: self.created_at,
            created_at_gt: self.created_at_gt,
            created_at_lt: self.created_at_lt,
        };
        (filter, Pagination::new(self.page, self.size))
    }
}

// ---------------------------------------------------------------------------
// Task statuses
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: NaiveDate,
}

impl From<TaskStatus> for TaskStatusResponse {
    fn from(status: TaskStatus) -> Self {
        Self {
            id: status.id,
            name: status.name,
            slug: status.slug,
            created_at: status.created_at.date_naive(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateTaskStatusRequest {
    #[schema(example = "In progress")]
    pub name: String,
    #[schema(example = "in_progress")]
    pub slug: String,
}

impl From<CreateTaskStatusRequest> for NewTaskStatus {
    fn from(req: CreateTaskStatusRequest) -> Self {
        NewTaskStatus {
            name: req.name,
            slug: req.slug,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateTaskStatusRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub slug: Patch<String>,
}

impl From<UpdateTaskStatusRequest> for TaskStatusUpdate {
    fn from(req: UpdateTaskStatusRequest) -> Self {
        TaskStatusUpdate {
            name: req.name,
            slug: req.slug,
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    pub id: i64,
    pub name: String,
    pub created_at: NaiveDate,
}

impl From<Label> for LabelResponse {
    fn from(label: Label) -> Self {
        Self {
            id: label.id,
            name: label.name,
            created_at: label.created_at.date_naive(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateLabelRequest {
    /// 3 to 1000 characters
    #[schema(example = "backend")]
    pub name: String,
}

impl From<CreateLabelRequest> for NewLabel {
    fn from(req: CreateLabelRequest) -> Self {
        NewLabel { name: req.name }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateLabelRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub name: Patch<String>,
}

impl From<UpdateLabelRequest> for LabelUpdate {
    fn from(req: UpdateLabelRequest) -> Self {
        LabelUpdate { name: req.name }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Status slug
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<i64>,
    pub task_label_ids: Vec<i64>,
    pub created_at: NaiveDate,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            index: task.index,
            title: task.name,
            content: task.description,
            status: task.status_slug,
            assignee_id: task.assignee_id,
            task_label_ids: task.label_ids.into_iter().collect(),
            created_at: task.created_at.date_naive(),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub index: Option<i32>,
    #[schema(example = "Write API documentation")]
    pub title: String,
    pub content: Option<String>,
    /// Status slug
    #[schema(example = "draft")]
    pub status: String,
    pub assignee_id: Option<i64>,
    #[serde(default, alias = "labelIds")]
    pub task_label_ids: BTreeSet<i64>,
}

impl From<CreateTaskRequest> for CreateTask {
    fn from(req: CreateTaskRequest) -> Self {
        CreateTask {
            index: req.index,
            title: req.title,
            content: req.content,
            status: req.status,
            assignee_id: req.assignee_id,
            label_ids: req.task_label_ids,
        }
    }
}

/// Partial update: omitted fields are left unchanged, `null` clears optional ones.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub index: Patch<i32>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub title: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub content: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Patch<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub assignee_id: Patch<i64>,
    #[serde(default, alias = "labelIds")]
    #[schema(value_type = Option<Vec<i64>>)]
    pub task_label_ids: Patch<BTreeSet<i64>>,
}

impl From<UpdateTaskRequest> for TaskUpdate {
    fn from(req: UpdateTaskRequest) -> Self {
        TaskUpdate {
            index: req.index,
            title: req.title,
            content: req.content,
            status: req.status,
            assignee_id: req.assignee_id,
            label_ids: req.task_label_ids,
        }
    }
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// Case-insensitive substring of the title
    pub title_cont: Option<String>,
    pub assignee_id: Option<i64>,
    /// Status slug
    pub status: Option<String>,
    pub label_id: Option<i64>,
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size (default 10, max 100)
    pub size: Option<u32>,
}

impl TaskListQuery {
    pub fn into_parts(self) -> (TaskFilter, Pagination) {
        let filter = TaskFilter {
            title_cont: self.title_cont,
            assignee_id: self.assignee_id,
            status: self.status,
            label_id: self.label_id,
        };
        (filter, Pagination::new(self.page, self.size))
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub backend: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}
