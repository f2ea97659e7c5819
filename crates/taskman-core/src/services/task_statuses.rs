use crate::error::AppError;
use crate::models::{NewTaskStatus, TaskStatus, TaskStatusUpdate};
use crate::store::{TaskStatusStore, TaskStore};

#[derive(Debug, Clone)]
pub struct TaskStatusService<S> {
    store: S,
}

impl<S> TaskStatusService<S>
where
    S: TaskStatusStore + TaskStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<TaskStatus>, AppError> {
        self.store.list_statuses().await
    }

    pub async fn get(&self, id: i64) -> Result<TaskStatus, AppError> {
        self.store
            .get_status(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task status not found: {id}")))
    }

    pub async fn create(&self, input: NewTaskStatus) -> Result<TaskStatus, AppError> {
        input.validate()?;
        self.ensure_unique(None, &input.name, &input.slug).await?;

        let status = self.store.create_status(input).await?;
        tracing::info!(status_id = status.id, slug = %status.slug, "Created task status");
        Ok(status)
    }

    pub async fn update(&self, id: i64, update: TaskStatusUpdate) -> Result<TaskStatus, AppError> {
        update.validate()?;
        let mut status = self.get(id).await?;

        update.name.apply_required(&mut status.name);
        update.slug.apply_required(&mut status.slug);
        self.ensure_unique(Some(id), &status.name, &status.slug)
            .await?;

        self.store.update_status(&status).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.get(id).await?;

        if self.store.has_tasks_with_status(id).await? {
            return Err(AppError::Conflict(
                "Cannot delete task status with associated tasks".into(),
            ));
        }

        self.store.delete_status(id).await?;
        tracing::info!(status_id = id, "Deleted task status");
        Ok(())
    }

    async fn ensure_unique(&self, id: Option<i64>, name: &str, slug: &str) -> Result<(), AppError> {
        let is_other = |s: &TaskStatus| Some(s.id) != id;

        if self
            .store
            .find_status_by_name(name)
            .await?
            .is_some_and(|s| is_other(&s))
        {
            return Err(AppError::Conflict(format!(
                "Task status with name {name} already exists"
            )));
        }
        if self
            .store
            .find_status_by_slug(slug)
            .await?
            .is_some_and(|s| is_other(&s))
        {
            return Err(AppError::Conflict(format!(
                "Task status with slug {slug} already exists"
            )));
        }
        Ok(())
    }
}
