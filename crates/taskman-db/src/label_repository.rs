use chrono::{DateTime, Utc};
use sqlx::PgPool;
use taskman_core::error::AppError;
use taskman_core::models::{Label, NewLabel};
use taskman_core::store::LabelStore;

use crate::error::map_sqlx;

/// Repository for labels in PostgreSQL.
#[derive(Clone)]
pub struct LabelRepository {
    pool: PgPool,
}

impl LabelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LabelStore for LabelRepository {
    async fn create_label(&self, label: NewLabel) -> Result<Label, AppError> {
        let row = sqlx::query_as::<_, LabelRow>(
            "INSERT INTO labels (name) VALUES ($1) RETURNING id, name, created_at",
        )
        .bind(&label.name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.into())
    }

    async fn get_label(&self, id: i64) -> Result<Option<Label>, AppError> {
        let row =
            sqlx::query_as::<_, LabelRow>("SELECT id, name, created_at FROM labels WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;

        Ok(row.map(Into::into))
    }

    async fn find_label_by_name(&self, name: &str) -> Result<Option<Label>, AppError> {
        let row = sqlx::query_as::<_, LabelRow>(
            "SELECT id, name, created_at FROM labels WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(Into::into))
    }

    async fn get_labels(&self, ids: &[i64]) -> Result<Vec<Label>, AppError> {
        let rows = sqlx::query_as::<_, LabelRow>(
            "SELECT id, name, created_at FROM labels WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn list_labels(&self) -> Result<Vec<Label>, AppError> {
        let rows = sqlx::query_as::<_, LabelRow>("SELECT id, name, created_at FROM labels ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_label(&self, label: &Label) -> Result<Label, AppError> {
        let row = sqlx::query_as::<_, LabelRow>(
            "UPDATE labels SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(label.id)
        .bind(&label.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Label not found: {}", label.id)))
    }

    async fn delete_label(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM labels WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct LabelRow {
    id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<LabelRow> for Label {
    fn from(row: LabelRow) -> Self {
        Label {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}
