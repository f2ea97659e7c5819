//! Runtime choice between PostgreSQL and the in-memory store.

use taskman_core::error::AppError;
use taskman_core::filter::{Page, Pagination, TaskFilter, UserFilter};
use taskman_core::memory::InMemoryStore;
use taskman_core::models::{
    Label, NewLabel, NewTask, NewTaskStatus, NewUser, Task, TaskStatus, User,
};
use taskman_core::store::{LabelStore, TaskStatusStore, TaskStore, UserStore};

use crate::database::Database;

/// The store the server and CLI hold.
///
/// `Postgres` is used whenever `DATABASE_URL` is configured; `Memory` keeps
/// all data in process and loses it on exit.
#[derive(Clone)]
pub enum Backend {
    Postgres(Database),
    Memory(InMemoryStore),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres(_) => "postgres",
            Backend::Memory(_) => "memory",
        }
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        match self {
            Backend::Postgres(db) => db.health_check().await,
            Backend::Memory(_) => Ok(()),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $repo:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            Backend::Postgres(db) => db.$repo().$method($($arg),*).await,
            Backend::Memory(mem) => mem.$method($($arg),*).await,
        }
    };
}

impl UserStore for Backend {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        dispatch!(self, users, create_user(user))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        dispatch!(self, users, get_user(id))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        dispatch!(self, users, find_user_by_email(email))
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: Pagination,
    ) -> Result<Page<User>, AppError> {
        dispatch!(self, users, list_users(filter, page))
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        dispatch!(self, users, update_user(user))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        dispatch!(self, users, delete_user(id))
    }
}

impl TaskStatusStore for Backend {
    async fn create_status(&self, status: NewTaskStatus) -> Result<TaskStatus, AppError> {
        dispatch!(self, task_statuses, create_status(status))
    }

    async fn get_status(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        dispatch!(self, task_statuses, get_status(id))
    }

    async fn find_status_by_slug(&self, slug: &str) -> Result<Option<TaskStatus>, AppError> {
        dispatch!(self, task_statuses, find_status_by_slug(slug))
    }

    async fn find_status_by_name(&self, name: &str) -> Result<Option<TaskStatus>, AppError> {
        dispatch!(self, task_statuses, find_status_by_name(name))
    }

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, AppError> {
        dispatch!(self, task_statuses, list_statuses())
    }

    async fn update_status(&self, status: &TaskStatus) -> Result<TaskStatus, AppError> {
        dispatch!(self, task_statuses, update_status(status))
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        dispatch!(self, task_statuses, delete_status(id))
    }
}

impl LabelStore for Backend {
    async fn create_label(&self, label: NewLabel) -> Result<Label, AppError> {
        dispatch!(self, labels, create_label(label))
    }

    async fn get_label(&self, id: i64) -> Result<Option<Label>, AppError> {
        dispatch!(self, labels, get_label(id))
    }

    async fn find_label_by_name(&self, name: &str) -> Result<Option<Label>, AppError> {
        dispatch!(self, labels, find_label_by_name(name))
    }

    async fn get_labels(&self, ids: &[i64]) -> Result<Vec<Label>, AppError> {
        dispatch!(self, labels, get_labels(ids))
    }

    async fn list_labels(&self) -> Result<Vec<Label>, AppError> {
        dispatch!(self, labels, list_labels())
    }

    async fn update_label(&self, label: &Label) -> Result<Label, AppError> {
        dispatch!(self, labels, update_label(label))
    }

    async fn delete_label(&self, id: i64) -> Result<bool, AppError> {
        dispatch!(self, labels, delete_label(id))
    }
}

impl TaskStore for Backend {
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        dispatch!(self, tasks, create_task(task))
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        dispatch!(self, tasks, get_task(id))
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: Pagination,
    ) -> Result<Page<Task>, AppError> {
        dispatch!(self, tasks, list_tasks(filter, page))
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        dispatch!(self, tasks, update_task(task))
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        dispatch!(self, tasks, delete_task(id))
    }

    async fn count_tasks(&self) -> Result<u64, AppError> {
        dispatch!(self, tasks, count_tasks())
    }

    async fn has_tasks_with_assignee(&self, user_id: i64) -> Result<bool, AppError> {
        dispatch!(self, tasks, has_tasks_with_assignee(user_id))
    }

    async fn has_tasks_with_status(&self, status_id: i64) -> Result<bool, AppError> {
        dispatch!(self, tasks, has_tasks_with_status(status_id))
    }

    async fn has_tasks_with_label(&self, label_id: i64) -> Result<bool, AppError> {
        dispatch!(self, tasks, has_tasks_with_label(label_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_delegates() {
        let backend = Backend::Memory(InMemoryStore::new());
        assert_eq!(backend.name(), "memory");
        assert!(backend.health_check().await.is_ok());

        let label = backend.create_label(NewLabel::new("feature")).await.unwrap();
        assert_eq!(
            backend.get_labels(&[label.id, 99]).await.unwrap().len(),
            1
        );
        assert!(backend.delete_label(label.id).await.unwrap());
    }
}
