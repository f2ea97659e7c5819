use crate::error::AppError;
use crate::models::{Label, LabelUpdate, NewLabel};
use crate::store::{LabelStore, TaskStore};

#[derive(Debug, Clone)]
pub struct LabelService<S> {
    store: S,
}

impl<S> LabelService<S>
where
    S: LabelStore + TaskStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Label>, AppError> {
        self.store.list_labels().await
    }

    pub async fn get(&self, id: i64) -> Result<Label, AppError> {
        self.store
            .get_label(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Label not found: {id}")))
    }

    pub async fn create(&self, input: NewLabel) -> Result<Label, AppError> {
        input.validate()?;
        self.ensure_unique(None, &input.name).await?;

        let label = self.store.create_label(input).await?;
        tracing::info!(label_id = label.id, name = %label.name, "Created label");
        Ok(label)
    }

    pub async fn update(&self, id: i64, update: LabelUpdate) -> Result<Label, AppError> {
        update.validate()?;
        let mut label = self.get(id).await?;

        update.name.apply_required(&mut label.name);
        self.ensure_unique(Some(id), &label.name).await?;

        self.store.update_label(&label).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.get(id).await?;

        if self.store.has_tasks_with_label(id).await? {
            return Err(AppError::Conflict(
                "Cannot delete label with associated tasks".into(),
            ));
        }

        self.store.delete_label(id).await?;
        tracing::info!(label_id = id, "Deleted label");
        Ok(())
    }

    async fn ensure_unique(&self, id: Option<i64>, name: &str) -> Result<(), AppError> {
        match self.store.find_label_by_name(name).await? {
            Some(existing) if Some(existing.id) != id => Err(AppError::Conflict(format!(
                "Label with name {name} already exists"
            ))),
            _ => Ok(()),
        }
    }
}
