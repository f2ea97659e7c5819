use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use taskman_core::error::AppError;
use taskman_core::filter::{Page, Pagination, UserFilter, like_pattern};
use taskman_core::models::{NewUser, Role, User};
use taskman_core::store::UserStore;

use crate::error::map_sqlx;

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_digest, role, created_at, updated_at";

/// Repository for user accounts in PostgreSQL.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    qb.push(" WHERE TRUE");

    if let Some(id) = filter.id {
        qb.push(" AND id = ").push_bind(id);
    }
    if let Some(email) = &filter.email {
        qb.push(" AND email = ").push_bind(email.clone());
    }
    if let Some(needle) = &filter.email_cont {
        qb.push(" AND email ILIKE ").push_bind(like_pattern(needle));
    }
    if let Some(name) = &filter.first_name {
        qb.push(" AND first_name = ").push_bind(name.clone());
    }
    if let Some(needle) = &filter.first_name_cont {
        qb.push(" AND first_name ILIKE ")
            .push_bind(like_pattern(needle));
    }
    if let Some(name) = &filter.last_name {
        qb.push(" AND last_name = ").push_bind(name.clone());
    }
    if let Some(needle) = &filter.last_name_cont {
        qb.push(" AND last_name ILIKE ").push_bind(like_pattern(needle));
    }
    if let Some(day) = filter.created_at {
        qb.push(" AND (created_at AT TIME ZONE 'UTC')::date = ")
            .push_bind(day);
    }
    if let Some(day) = filter.created_at_gt {
        qb.push(" AND (created_at AT TIME ZONE 'UTC')::date > ")
            .push_bind(day);
    }
    if let Some(day) = filter.created_at_lt {
        qb.push(" AND (created_at AT TIME ZONE 'UTC')::date < ")
            .push_bind(day);
    }
}

impl UserStore for UserRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, password_digest, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_digest)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.try_into()
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: Pagination,
    ) -> Result<Page<User>, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filter(&mut count, filter);
        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY id LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<UserRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<_, _>>()?,
            total: total as u64,
        })
    }

    async fn update_user(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET email = $2, first_name = $3, last_name = $4, password_digest = $5,
                role = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_digest)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(AppError::NotFound(format!("User not found: {}", user.id))),
        }
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    password_digest: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e: String| AppError::DatabaseError(format!("Corrupt user row {}: {e}", row.id)))?;

        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_digest: row.password_digest,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
