use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use taskman_core::error::AppError;
use taskman_core::filter::{Page, Pagination, TaskFilter, like_pattern};
use taskman_core::models::{NewTask, Task};
use taskman_core::store::TaskStore;

use crate::error::map_sqlx;

/// Task columns plus the status slug and the aggregated label ids.
/// Must be followed by a `WHERE` clause and [`TASK_GROUP_BY`].
const TASK_SELECT: &str = r#"
    SELECT t.id, t.task_index, t.name, t.description, t.task_status_id,
           s.slug AS status_slug, t.assignee_id, t.created_at,
           COALESCE(
               ARRAY_AGG(tl.label_id ORDER BY tl.label_id) FILTER (WHERE tl.label_id IS NOT NULL),
               '{}'
           ) AS label_ids
    FROM tasks t
    JOIN task_statuses s ON s.id = t.task_status_id
    LEFT JOIN task_labels tl ON tl.task_id = t.id
"#;

const TASK_GROUP_BY: &str = " GROUP BY t.id, s.slug";

/// Repository for tasks and their label links in PostgreSQL.
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, sql: &str, id: i64) -> Result<bool, AppError> {
        let (found,): (bool,) = sqlx::query_as(sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(found)
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &TaskFilter) {
    qb.push(" WHERE TRUE");

    if let Some(needle) = filter.title_cont() {
        qb.push(" AND t.name ILIKE ").push_bind(like_pattern(needle));
    }
    if let Some(assignee_id) = filter.assignee_id {
        qb.push(" AND t.assignee_id = ").push_bind(assignee_id);
    }
    if let Some(slug) = filter.status() {
        qb.push(" AND s.slug = ").push_bind(slug.to_string());
    }
    if let Some(label_id) = filter.label_id {
        qb.push(" AND EXISTS (SELECT 1 FROM task_labels f WHERE f.task_id = t.id AND f.label_id = ")
            .push_bind(label_id)
            .push(")");
    }
}

async fn insert_labels(
    tx: &mut Transaction<'_, Postgres>,
    task_id: i64,
    label_ids: &BTreeSet<i64>,
) -> Result<(), AppError> {
    if label_ids.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = label_ids.iter().copied().collect();
    sqlx::query("INSERT INTO task_labels (task_id, label_id) SELECT $1, UNNEST($2::BIGINT[])")
        .bind(task_id)
        .bind(ids)
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx)?;
    Ok(())
}

impl TaskStore for TaskRepository {
    async fn create_task(&self, task: NewTask) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO tasks (task_index, name, description, task_status_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(task.index)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.task_status_id)
        .bind(task.assignee_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        insert_labels(&mut tx, id, &task.label_ids).await?;
        tx.commit().await.map_err(map_sqlx)?;

        self.get_task(id)
            .await?
            .ok_or_else(|| AppError::DatabaseError(format!("Task {id} vanished after insert")))
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(TASK_SELECT);
        qb.push(" WHERE t.id = ").push_bind(id).push(TASK_GROUP_BY);

        let row: Option<TaskRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(row.map(Into::into))
    }

    async fn list_tasks(
        &self,
        filter: &TaskFilter,
        page: Pagination,
    ) -> Result<Page<Task>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM tasks t JOIN task_statuses s ON s.id = t.task_status_id",
        );
        push_filter(&mut count, filter);
        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut select = QueryBuilder::<Postgres>::new(TASK_SELECT);
        push_filter(&mut select, filter);
        select
            .push(TASK_GROUP_BY)
            .push(" ORDER BY t.id LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<TaskRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total: total as u64,
        })
    }

    async fn update_task(&self, task: &Task) -> Result<Task, AppError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET task_index = $2, name = $3, description = $4, task_status_id = $5, assignee_id = $6
            WHERE id = $1
            "#,
        )
        .bind(task.id)
        .bind(task.index)
        .bind(&task.name)
        .bind(&task.description)
        .bind(task.task_status_id)
        .bind(task.assignee_id)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Task not found: {}", task.id)));
        }

        sqlx::query("DELETE FROM task_labels WHERE task_id = $1")
            .bind(task.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        insert_labels(&mut tx, task.id, &task.label_ids).await?;
        tx.commit().await.map_err(map_sqlx)?;

        self.get_task(task.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Task not found: {}", task.id)))
    }

    async fn delete_task(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_tasks(&self) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(count as u64)
    }

    async fn has_tasks_with_assignee(&self, user_id: i64) -> Result<bool, AppError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE assignee_id = $1)",
            user_id,
        )
        .await
    }

    async fn has_tasks_with_status(&self, status_id: i64) -> Result<bool, AppError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE task_status_id = $1)",
            status_id,
        )
        .await
    }

    async fn has_tasks_with_label(&self, label_id: i64) -> Result<bool, AppError> {
        self.exists(
            "SELECT EXISTS (SELECT 1 FROM task_labels WHERE label_id = $1)",
            label_id,
        )
        .await
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    task_index: Option<i32>,
    name: String,
    description: Option<String>,
    task_status_id: i64,
    status_slug: String,
    assignee_id: Option<i64>,
    created_at: DateTime<Utc>,
    label_ids: Vec<i64>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            index: row.task_index,
            name: row.name,
            description: row.description,
            task_status_id: row.task_status_id,
            status_slug: row.status_slug,
            assignee_id: row.assignee_id,
            label_ids: row.label_ids.into_iter().collect(),
            created_at: row.created_at,
        }
    }
}
