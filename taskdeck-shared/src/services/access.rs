/// Ownership-scoped access layer
///
/// The only entry point the REST and GraphQL façades use for task data.
/// Each operation:
///
/// 1. rejects `AuthContext::Unauthenticated` with `AuthenticationRequired`
/// 2. resolves the caller's identity (by id for session tokens, by external
///    subject for gateway principals), `NotFound` if it no longer exists
/// 3. delegates to the repository or lifecycle engine scoped to that identity
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdeck_shared::auth::middleware::AuthContext;
/// use taskdeck_shared::error::ServiceError;
/// use taskdeck_shared::services::TaskService;
/// use taskdeck_shared::store::memory::{MemoryIdentityStore, MemoryTaskStore};
///
/// # async fn example() {
/// let service = TaskService::new(
///     Arc::new(MemoryIdentityStore::new()),
///     Arc::new(MemoryTaskStore::new()),
/// );
///
/// let err = service.list_tasks(&AuthContext::Unauthenticated).await.unwrap_err();
/// assert_eq!(err, ServiceError::AuthenticationRequired);
/// # }
/// ```
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::lifecycle::TaskLifecycle;
use super::repository::TaskRepository;
use crate::auth::middleware::{AuthContext, PrincipalRef};
use crate::error::{ServiceError, ServiceResult};
use crate::models::identity::Identity;
use crate::models::task::{Task, TaskChanges};
use crate::store::{IdentityStore, TaskStore};

#[derive(Clone)]
pub struct TaskService {
    identities: Arc<dyn IdentityStore>,
    repository: TaskRepository,
    lifecycle: TaskLifecycle,
}

impl TaskService {
    pub fn new(identities: Arc<dyn IdentityStore>, tasks: Arc<dyn TaskStore>) -> Self {
        let repository = TaskRepository::new(tasks);
        let lifecycle = TaskLifecycle::new(repository.clone());

        Self {
            identities,
            repository,
            lifecycle,
        }
    }

    /// Identity behind the request
    pub async fn current_identity(&self, auth: &AuthContext) -> ServiceResult<Identity> {
        let identity = match auth {
            AuthContext::Unauthenticated => return Err(ServiceError::AuthenticationRequired),
            AuthContext::Authenticated(PrincipalRef::Identity(id)) => {
                self.identities.find_by_id(*id).await?
            }
            AuthContext::Authenticated(PrincipalRef::External { subject }) => {
                self.identities.find_by_external_subject(subject).await?
            }
        };

        let identity = identity.ok_or_else(ServiceError::identity_not_found)?;
        debug!(identity_id = %identity.id, "Resolved caller");
        Ok(identity)
    }

    async fn owner_id(&self, auth: &AuthContext) -> ServiceResult<Uuid> {
        Ok(self.current_identity(auth).await?.id)
    }

    pub async fn create_task(
        &self,
        auth: &AuthContext,
        title: &str,
        description: Option<&str>,
    ) -> ServiceResult<Task> {
        let owner = self.owner_id(auth).await?;
        self.repository.create(owner, title, description).await
    }

    pub async fn list_tasks(&self, auth: &AuthContext) -> ServiceResult<Vec<Task>> {
        let owner = self.owner_id(auth).await?;
        self.repository.list_by_owner(owner).await
    }

    pub async fn get_task(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<Task> {
        let owner = self.owner_id(auth).await?;
        self.repository.find_by_id(owner, id).await
    }

    pub async fn update_task(
        &self,
        auth: &AuthContext,
        id: Uuid,
        changes: TaskChanges,
    ) -> ServiceResult<Task> {
        let owner = self.owner_id(auth).await?;
        self.repository.update(owner, id, changes).await
    }

    pub async fn delete_task(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<()> {
        let owner = self.owner_id(auth).await?;
        self.repository.delete(owner, id).await
    }

    pub async fn change_task_status(
        &self,
        auth: &AuthContext,
        id: Uuid,
        status: &str,
    ) -> ServiceResult<Task> {
        let owner = self.owner_id(auth).await?;
        self.lifecycle.change_status(owner, id, status).await
    }

    /// Storage connectivity, for health checks
    pub async fn storage_ready(&self) -> bool {
        self.repository.ping().await.is_ok()
    }
}
