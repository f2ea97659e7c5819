use std::collections::BTreeSet;

use crate::error::AppError;
use crate::filter::{Page, Pagination, TaskFilter};
use crate::models::{CreateTask, NewTask, Task, TaskStatus, TaskUpdate};
use crate::patch::Patch;
use crate::store::Store;

/// Task CRUD with reference resolution.
///
/// Clients address statuses by slug and labels by id; both are resolved here
/// so that a dangling reference is reported as a missing resource rather than
/// surfacing as a constraint violation from the store.
#[derive(Debug, Clone)]
pub struct TaskService<S> {
    store: S,
}

impl<S: Store> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self, filter: &TaskFilter, page: Pagination) -> Result<Page<Task>, AppError> {
        self.store.list_tasks(filter, page).await
    }

    pub async fn get(&self, id: i64) -> Result<Task, AppError> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task not found: {id}")))
    }

    pub async fn create(&self, input: CreateTask) -> Result<Task, AppError> {
        input.validate()?;

        let status = self.resolve_status(&input.status).await?;
        if let Some(assignee_id) = input.assignee_id {
            self.ensure_user(assignee_id).await?;
        }
        self.ensure_labels(&input.label_ids).await?;

        let task = self
            .store
            .create_task(NewTask {
                index: input.index,
                name: input.title,
                description: input.content,
                task_status_id: status.id,
                assignee_id: input.assignee_id,
                label_ids: input.label_ids,
            })
            .await?;

        tracing::info!(task_id = task.id, status = %task.status_slug, "Created task");
        Ok(task)
    }

    /// Apply the fields present in `update`.
    ///
    /// A `null` assignee unassigns the task; a `null` label list clears it.
    pub async fn update(&self, id: i64, update: TaskUpdate) -> Result<Task, AppError> {
        update.validate()?;
        let mut task = self.get(id).await?;

        if let Some(slug) = update.status.value() {
            let status = self.resolve_status(slug).await?;
            task.task_status_id = status.id;
            task.status_slug = status.slug;
        }
        if let Some(assignee_id) = update.assignee_id.value() {
            self.ensure_user(*assignee_id).await?;
        }
        match update.label_ids {
            Patch::Value(ids) => {
                self.ensure_labels(&ids).await?;
                task.label_ids = ids;
            }
            Patch::Null => task.label_ids.clear(),
            Patch::Missing => {}
        }

        update.index.apply_to(&mut task.index);
        update.title.apply_required(&mut task.name);
        update.content.apply_to(&mut task.description);
        update.assignee_id.apply_to(&mut task.assignee_id);

        let task = self.store.update_task(&task).await?;
        tracing::info!(task_id = id, "Updated task");
        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.store.delete_task(id).await? {
            return Err(AppError::NotFound(format!("Task not found: {id}")));
        }
        tracing::info!(task_id = id, "Deleted task");
        Ok(())
    }

    async fn resolve_status(&self, slug: &str) -> Result<TaskStatus, AppError> {
        self.store
            .find_status_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task status not found: {slug}")))
    }

    async fn ensure_user(&self, id: i64) -> Result<(), AppError> {
        match self.store.get_user(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound(format!("User not found: {id}"))),
        }
    }

    async fn ensure_labels(&self, ids: &BTreeSet<i64>) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }

        let wanted: Vec<i64> = ids.iter().copied().collect();
        let found: BTreeSet<i64> = self
            .store
            .get_labels(&wanted)
            .await?
            .into_iter()
            .map(|l| l.id)
            .collect();

        let missing: Vec<String> = ids
            .difference(&found)
            .map(|id| id.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Labels not found: {}",
                missing.join(", ")
            )))
        }
    }
}
