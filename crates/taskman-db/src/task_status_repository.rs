use chrono::{DateTime, Utc};
use sqlx::PgPool;
use taskman_core::error::AppError;
use taskman_core::models::{NewTaskStatus, TaskStatus};
use taskman_core::store::TaskStatusStore;

use crate::error::map_sqlx;

/// Repository for task statuses in PostgreSQL.
#[derive(Clone)]
pub struct TaskStatusRepository {
    pool: PgPool,
}

impl TaskStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<TaskStatus>, AppError> {
        let row = sqlx::query_as::<_, TaskStatusRow>(&format!(
            "SELECT id, name, slug, created_at FROM task_statuses WHERE {column} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(Into::into))
    }
}

impl TaskStatusStore for TaskStatusRepository {
    async fn create_status(&self, status: NewTaskStatus) -> Result<TaskStatus, AppError> {
        let row = sqlx::query_as::<_, TaskStatusRow>(
            r#"
            INSERT INTO task_statuses (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(&status.name)
        .bind(&status.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.into())
    }

    async fn get_status(&self, id: i64) -> Result<Option<TaskStatus>, AppError> {
        let row = sqlx::query_as::<_, TaskStatusRow>(
            "SELECT id, name, slug, created_at FROM task_statuses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(Into::into))
    }

    async fn find_status_by_slug(&self, slug: &str) -> Result<Option<TaskStatus>, AppError> {
        self.find_one("slug", slug).await
    }

    async fn find_status_by_name(&self, name: &str) -> Result<Option<TaskStatus>, AppError> {
        self.find_one("name", name).await
    }

    async fn list_statuses(&self) -> Result<Vec<TaskStatus>, AppError> {
        let rows = sqlx::query_as::<_, TaskStatusRow>(
            "SELECT id, name, slug, created_at FROM task_statuses ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_status(&self, status: &TaskStatus) -> Result<TaskStatus, AppError> {
        let row = sqlx::query_as::<_, TaskStatusRow>(
            r#"
            UPDATE task_statuses SET name = $2, slug = $3
            WHERE id = $1
            RETURNING id, name, slug, created_at
            "#,
        )
        .bind(status.id)
        .bind(&status.name)
        .bind(&status.slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Task status not found: {}", status.id)))
    }

    async fn delete_status(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM task_statuses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct TaskStatusRow {
    id: i64,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<TaskStatusRow> for TaskStatus {
    fn from(row: TaskStatusRow) -> Self {
        TaskStatus {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
        }
    }
}
