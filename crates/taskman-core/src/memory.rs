//! In-process store backend.
//!
//! Holds every table in a single `Arc<Mutex<_>>`, so clones share state.
//! Serves development runs without `DATABASE_URL` and the test suites. It
//! enforces the same unique and reference constraints as the SQL schema.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::filter::{Page, Pagination, TaskFilter, UserFilter};
use crate::models::{Label, NewLabel, NewTask, NewTaskStatus, NewUser, Task, TaskStatus, User};
use crate::store::{LabelStore, TaskStatusStore, TaskStore, UserStore};

#[derive(Debug, Clone)]
struct TaskRecord {
    id: i64,
    index: Option<i32>,
    name: String,
    description: Option<String>,
    task_status_id: i64,
    assignee_id: Option<i64>,
    label_ids: BTreeSet<i64>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    statuses: BTreeMap<i64, TaskStatus>,
    labels: BTreeMap<i64, Label>,
    tasks: BTreeMap<i64, TaskRecord>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn hydrate(&self, record: &TaskRecord) -> Task {
        let status_slug = self
            .statuses
            .get(&record.task_status_id)
            .map(|s| s.slug.clone())
            .unwrap_or_default();

        Task {
            id: record.id,
            index: record.index,
            name: record.name.clone(),
            description: record.description.clone(),
            task_status_id: record.task_status_id,
            status_slug,
            assignee_id: record.assignee_id,
            label_ids: record.label_ids.clone(),
            created_at: record.created_at,
        }
    }

    fn check_task_references(
        &self,
        task_status_id: i64,
        assignee_id: Option<i64>,
        label_ids: &BTreeSet<i64>,
    ) -> Result<(), AppError> {
        if !self.statuses.contains_key(&task_status_id) {
            return Err(AppError::Conflict(format!(
                "Task status {task_status_id} does not exist"
            )));
        }
        if let Some(user_id) = assignee_id
            && !self.users.contains_key(&user_id)
        {
            return Err(AppError::Conflict(format!("User {user_id} does not exist")));
        }
        if let Some(missing) = label_ids.iter().find(|id| !self.labels.contains_key(id)) {
            return Err(AppError::Conflict(format!("Label {missing} does not exist")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut t = self.tables();
        if t.users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        let now = Utc::now();
        let id = t.next_id();
        let user = User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_digest: user.password_digest,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: Pagination,
    ) -> Result<Page<User>, AppError> {
        let matching: Vec<User> = self
            .tables()
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect();
        let total = matching.len() as u64;

        Ok(Page {
            items: page.apply(matching),
            total,
        })
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let mut t = self.tables();
        if !t.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!("User not found: {}", user.id)));
        }
        if t
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(AppError::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }

        let mut updated = user.clone();
        updated.updated_at = Utc::now();
        t.users.insert(user.id, updated.clone());
        Ok(updated)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables();
        if t.tasks.values().any(|task| task.assignee_id == Some(id)) {
            return Err(AppError::Conflict(
                "Cannot delete user with associated tasks".into(),
            ));
        }
        Ok(t.users.remove(&id).is_some())
    }
}

impl TaskStatusStore for InMemoryStore {
    async fn create_status(&self, status: NewTaskStatus) -> Result<TaskStatus, AppError> {
        let mut t = self.tables();
        if t.statuses.values().any(|s| s.name == status.name) {
            return Err(AppError::Conflict(format!(
                "Task status with name {} already exists",
                status.name
            )));
        }
        if t.statuses.values().any(|s| s.slug == status.slug) {
            return Err(AppError::Conflict(format!(
                "Task status with slug {} already exists",
                status.slug
            )));
        }

        let id = t.next_id();
        let status = TaskStatus {
            id,
            name: status.name,
            slug: status.slug,
            created_at: Utc::now(),
        };
        t.statuses.insert(id, status.clone());
        Ok(status)
    }

    async fn get_status(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        Ok(self.tables().statuses.get(&id).cloned())
    }

    async fn find_status_by_slug(&self, slug: &str) -> Result<Option<TaskStatus>, AppError> {
        Ok(self
            .tables()
            .statuses
            .values()
            .find(|s| s.slug == slug)
            .cloned())
    }

    async fn find_status_by_name(&self, name: &str) -> Result<Option<TaskStatus>, AppError> {
        Ok(self
            .tables()
            .statuses
            .values()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, AppError> {
        Ok(self.tables().statuses.values().cloned().collect())
    }

    async fn update_status(&self, status: &TaskStatus) -> Result<TaskStatus, AppError> {
        let mut t = self.tables();
        if !t.statuses.contains_key(&status.id) {
            return Err(AppError::NotFound(format!(
                "Task status not found: {}",
                status.id
            )));
        }
        let others = t.statuses.values().filter(|s| s.id != status.id);
        for other in others {
            if other.name == status.name || other.slug == status.slug {
                return Err(AppError::Conflict(format!(
                    "Task status {} / {} already exists",
                    status.name, status.slug
                )));
            }
        }

        t.statuses.insert(status.id, status.clone());
        Ok(status.clone())
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables();
        if t.tasks.values().any(|task| task.task_status_id == id) {
            return Err(AppError::Conflict(
                "Cannot delete task status with associated tasks".into(),
            ));
        }
        Ok(t.statuses.remove(&id).is_some())
    }
}

impl LabelStore for InMemoryStore {
    async fn create_label(&self, label: NewLabel) -> Result<Label, AppError> {
        let mut t = self.tables();
        if t.labels.values().any(|l| l.name == label.name) {
            return Err(AppError::Conflict(format!(
                "Label with name {} already exists",
                label.name
            )));
        }

        let id = t.next_id();
        let label = Label {
            id,
            name: label.name,
            created_at: Utc::now(),
        };
        t.labels.insert(id, label.clone());
        Ok(label)
    }

    async fn get_label(&self, id: i64) -> Result<Option<Label>, AppError> {
        Ok(self.tables().labels.get(&id).cloned())
    }

    async fn find_label_by_name(&self, name: &str) -> Result<Option<Label>, AppError> {
        Ok(self
            .tables()
            .labels
            .values()
            .find(|l| l.name == name)
            .cloned())
    }

    async fn get_labels(&self, ids: &[i64]) -> Result<Vec<Label>, AppError> {
        let t = self.tables();
        let wanted: BTreeSet<i64> = ids.iter().copied().collect();
        Ok(wanted
            .iter()
            .filter_map(|id| t.labels.get(id).cloned())
            .collect())
    }

    async fn list_labels(&self) -> Result<Vec<Label>, AppError> {
        Ok(self.tables().labels.values().cloned().collect())
    }

    async fn update_label(&self, label: &Label) -> Result<Label, AppError> {
        let mut t = self.tables();
        if !t.labels.contains_key(&label.id) {
            return Err(AppError::NotFound(format!("Label not found: {}", label.id)));
        }
        if t
            .labels
            .values()
            .any(|l| l.id != label.id && l.name == label.name)
        {
            return Err(AppError::Conflict(format!(
                "Label with name {} already exists",
                label.name
            )));
        }

        t.labels.insert(label.id, label.clone());
        Ok(label.clone())
    }

    async fn delete_label(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.tables();
        if t.tasks.values().any(|task| task.label_ids.contains(&id)) {
            return Err(AppError::Conflict(
                "Cannot delete label with associated tasks".into(),
            ));
        }
        Ok(t.labels.remove(&id).is_some())
    }
}

impl TaskStore for InMemoryStore {
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut t = self.tables();
        t.check_task_references(task.task_status_id, task.assignee_id, &task.label_ids)?;

        let id = t.next_id();
        let record = TaskRecord {
            id,
            index: task.index,
            name: task.name,
            description: task.description,
            task_status_id: task.task_status_id,
            assignee_id: task.assignee_id,
            label_ids: task.label_ids,
            created_at: Utc::now(),
        };
        let hydrated = t.hydrate(&record);
        t.tasks.insert(id, record);
        Ok(hydrated)
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let t = self.tables();
        Ok(t.tasks.get(&id).map(|r| t.hydrate(r)))
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: Pagination,
    ) -> Result<Page<Task>, AppError> {
        let t = self.tables();
        let matching: Vec<Task> = t
            .tasks
            .values()
            .map(|r| t.hydrate(r))
            .filter(|task| filter.matches(task))
            .collect();
        let total = matching.len() as u64;

        Ok(Page {
            items: page.apply(matching),
            total,
        })
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut t = self.tables();
        let Some(existing) = t.tasks.get(&task.id) else {
            return Err(AppError::NotFound(format!("Task not found: {}", task.id)));
        };
        let created_at = existing.created_at;
        t.check_task_references(task.task_status_id, task.assignee_id, &task.label_ids)?;

        let record = TaskRecord {
            id: task.id,
            index: task.index,
            name: task.name.clone(),
            description: task.description.clone(),
            task_status_id: task.task_status_id,
            assignee_id: task.assignee_id,
            label_ids: task.label_ids.clone(),
            created_at,
        };
        let hydrated = t.hydrate(&record);
        t.tasks.insert(task.id, record);
        Ok(hydrated)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables().tasks.remove(&id).is_some())
    }

    async fn count_tasks(&self) -> Result<u64, AppError> {
        Ok(self.tables().tasks.len() as u64)
    }

    async fn has_tasks_with_assignee(&self, user_id: i64) -> Result<bool, AppError> {
        Ok(self
            .tables()
            .tasks
            .values()
            .any(|t| t.assignee_id == Some(user_id)))
    }

    async fn has_tasks_with_status(&self, status_id: i64) -> Result<bool, AppError> {
        Ok(self
            .tables()
            .tasks
            .values()
            .any(|t| t.task_status_id == status_id))
    }

    async fn has_tasks_with_label(&self, label_id: i64) -> Result<bool, AppError> {
        Ok(self
            .tables()
            .tasks
            .values()
            .any(|t| t.label_ids.contains(&label_id)))
    }
}
