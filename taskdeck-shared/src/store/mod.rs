/// Storage ports
///
/// The services talk to storage only through these two traits. Two adapters
/// implement them:
///
/// - [`postgres`]: sqlx-backed, used in production
/// - [`memory`]: `RwLock<HashMap>`-backed, used by tests and when no
///   `DATABASE_URL` is configured
///
/// Both are constructed once at startup and injected as
/// `Arc<dyn IdentityStore>` / `Arc<dyn TaskStore>`.
///
/// # Consistency
///
/// Each call is a single statement against a single record. There are no
/// multi-record transactions and no version tokens: concurrent writes to the
/// same task are last-write-wins.
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::identity::{Identity, NewIdentity};
use crate::models::task::{NewTask, Task, TaskPatch};

pub mod memory;
pub mod postgres;

/// Result alias for storage calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for storage adapters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate value for {0}")]
    Conflict(String),

    /// The backend failed
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Convert sqlx errors to storage errors
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                // 23505 = unique_violation
                if db_err.code().as_deref() == Some("23505") {
                    let field = match db_err.constraint() {
                        Some(c) if c.contains("email") => "email",
                        Some(c) if c.contains("username") => "username",
                        Some(c) if c.contains("external_subject") => "external subject",
                        Some(c) => c,
                        None => "unique field",
                    };
                    return StoreError::Conflict(field.to_string());
                }
                StoreError::Backend(format!("Database error: {}", db_err))
            }
            _ => StoreError::Backend(format!("Database error: {}", err)),
        }
    }
}

/// Identity persistence
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Inserts a new identity
    ///
    /// # Errors
    ///
    /// `StoreError::Conflict` when email, username or external subject is
    /// already taken (case-insensitively for email/username).
    async fn insert(&self, identity: NewIdentity) -> StoreResult<Identity>;

    /// Finds an identity by ID
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>>;

    /// Finds an identity by external auth subject
    async fn find_by_external_subject(&self, subject: &str) -> StoreResult<Option<Identity>>;

    /// Finds an identity whose email OR username equals `login`
    ///
    /// `login` must already be normalized (trimmed, lowercased).
    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Identity>>;

    /// Single combined existence check across email, username and subject
    async fn exists(
        &self,
        email: &str,
        username: &str,
        external_subject: Option<&str>,
    ) -> StoreResult<bool>;
}

/// Task persistence
///
/// Every lookup and mutation takes the owner id; a task owned by someone else
/// is indistinguishable from a missing one.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task with status `PENDING` and both timestamps set to now
    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    /// Finds a task by ID, only if owned by `owner_id`
    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists an owner's tasks, most recently updated first
    async fn list_owned(&self, owner_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Writes the fields set in `patch` and refreshes `updated_at`
    ///
    /// The row is matched on both `id` and `owner_id`; the owner column is
    /// never written and fields absent from the patch keep their stored
    /// value. Returns `None` when no such row exists.
    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TaskPatch,
    ) -> StoreResult<Option<Task>>;

    /// Hard-deletes a task; returns false when nothing matched
    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool>;

    /// Checks backend connectivity
    async fn ping(&self) -> StoreResult<()>;
}
