use std::future::Future;

use crate::error::AppError;
use crate::filter::{Page, Pagination, TaskFilter, UserFilter};
use crate::models::{Label, NewLabel, NewTask, NewTaskStatus, NewUser, Task, TaskStatus, User};

/// Persists user accounts.
///
/// Implementations must reject a second account with the same e-mail with
/// [`AppError::Conflict`].
pub trait UserStore: Send + Sync + Clone {
    fn create_user(&self, user: NewUser) -> impl Future<Output = Result<User, AppError>> + Send;

    fn get_user(&self, id: i64) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, AppError>> + Send;

    /// Matching users ordered by id.
    fn list_users(
        &self,
        filter: &UserFilter,
        page: Pagination,
    ) -> impl Future<Output = Result<Page<User>, AppError>> + Send;

    /// Persist every mutable column of `user` and bump `updated_at`.
    fn update_user(&self, user: &User) -> impl Future<Output = Result<User, AppError>> + Send;

    /// Returns `false` if no row was deleted.
    fn delete_user(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists task statuses. Names and slugs are unique.
pub trait TaskStatusStore: Send + Sync + Clone {
    fn create_status(
        &self,
        status: NewTaskStatus,
    ) -> impl Future<Output = Result<TaskStatus, AppError>> + Send;

    fn get_status(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<TaskStatus>, AppError>> + Send;

    fn find_status_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<TaskStatus>, AppError>> + Send;

    fn find_status_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<TaskStatus>, AppError>> + Send;

    fn list_statuses(&self) -> impl Future<Output = Result<Vec<TaskStatus>, AppError>> + Send;

    fn update_status(
        &self,
        status: &TaskStatus,
    ) -> impl Future<Output = Result<TaskStatus, AppError>> + Send;

    fn delete_status(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists labels. Names are unique.
pub trait LabelStore: Send + Sync + Clone {
    fn create_label(
        &self,
        label: NewLabel,
    ) -> impl Future<Output = Result<Label, AppError>> + Send;

    fn get_label(&self, id: i64) -> impl Future<Output = Result<Option<Label>, AppError>> + Send;

    fn find_label_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Label>, AppError>> + Send;

    /// The subset of `ids` that exist, ordered by id.
    fn get_labels(&self, ids: &[i64]) -> impl Future<Output = Result<Vec<Label>, AppError>> + Send;

    fn list_labels(&self) -> impl Future<Output = Result<Vec<Label>, AppError>> + Send;

    fn update_label(&self, label: &Label) -> impl Future<Output = Result<Label, AppError>> + Send;

    fn delete_label(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// Persists tasks and their label links.
pub trait TaskStore: Send + Sync + Clone {
    fn create_task(&self, task: NewTask) -> impl Future<Output = Result<Task, AppError>> + Send;

    fn get_task(&self, id: i64) -> impl Future<Output = Result<Option<Task>, AppError>> + Send;

    /// Matching tasks ordered by id.
    fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: Pagination,
    ) -> impl Future<Output = Result<Page<Task>, AppError>> + Send;

    /// Persist every mutable column of `task`, replacing its label set.
    fn update_task(&self, task: &Task) -> impl Future<Output = Result<Task, AppError>> + Send;

    fn delete_task(&self, id: i64) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn count_tasks(&self) -> impl Future<Output = Result<u64, AppError>> + Send;

    fn has_tasks_with_assignee(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn has_tasks_with_status(
        &self,
        status_id: i64,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn has_tasks_with_label(
        &self,
        label_id: i64,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;
}

/// A backend that stores every entity.
pub trait Store: UserStore + TaskStatusStore + LabelStore + TaskStore {}

impl<T> Store for T where T: UserStore + TaskStatusStore + LabelStore + TaskStore {}
