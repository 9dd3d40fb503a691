/// PostgreSQL storage adapters
///
/// Queries follow the schema in `migrations/`. Email and username are stored
/// lowercased and matched through `LOWER(...)` so the unique indexes on
/// `LOWER(email)` / `LOWER(username)` serve the lookups.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskdeck_shared::store::postgres::{PgIdentityStore, PgTaskStore};
/// use taskdeck_shared::store::{IdentityStore, TaskStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let identities: Arc<dyn IdentityStore> = Arc::new(PgIdentityStore::new(pool.clone()));
/// let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{IdentityStore, StoreResult, TaskStore};
use crate::db::pool::health_check;
use crate::models::identity::{Identity, NewIdentity};
use crate::models::task::{NewTask, Task, TaskPatch};

const IDENTITY_COLUMNS: &str =
    "id, name, email, username, password_hash, external_subject, created_at, updated_at";

const TASK_COLUMNS: &str = "id, owner_id, title, description, status, created_at, updated_at";

/// Identity store backed by the `identities` table
#[derive(Debug, Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn insert(&self, data: NewIdentity) -> StoreResult<Identity> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            r#"
            INSERT INTO identities (name, email, username, password_hash, external_subject)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {IDENTITY_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.username)
        .bind(data.password_hash)
        .bind(data.external_subject)
        .fetch_one(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_external_subject(&self, subject: &str) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE external_subject = $1"
        ))
        .bind(subject)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Identity>> {
        let identity = sqlx::query_as::<_, Identity>(&format!(
            r#"
            SELECT {IDENTITY_COLUMNS}
            FROM identities
            WHERE LOWER(email) = $1 OR LOWER(username) = $1
            ORDER BY (LOWER(email) = $1) DESC
            LIMIT 1
            "#
        ))
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn exists(
        &self,
        email: &str,
        username: &str,
        external_subject: Option<&str>,
    ) -> StoreResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM identities
                WHERE LOWER(email) = $1
                   OR LOWER(username) = $2
                   OR ($3::TEXT IS NOT NULL AND external_subject = $3)
            )
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(external_subject)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

/// Task store backed by the `tasks` table
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, data: NewTask) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (owner_id, title, description)
            VALUES ($1, $2, $3)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_owned(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE owner_id = $1
            ORDER BY updated_at DESC, created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TaskPatch,
    ) -> StoreResult<Option<Task>> {
        let (set_description, description) = match &patch.description {
            Some(description) => (true, description.clone()),
            None => (false, None),
        };

        let updated = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(patch.title.as_deref())
        .bind(set_description)
        .bind(description)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await?;
        Ok(())
    }
}
