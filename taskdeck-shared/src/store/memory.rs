/// In-memory storage adapters
///
/// Thread-safe `HashMap` stores that mirror the Postgres adapters, including
/// the unique indexes on email, username and external subject. Used by the
/// test suites and by the API server when no database is configured.
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{IdentityStore, StoreError, StoreResult, TaskStore};
use crate::models::identity::{Identity, NewIdentity};
use crate::models::task::{NewTask, Task, TaskPatch, TaskStatus};

/// In-memory identity store
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStore {
    identities: Arc<RwLock<HashMap<Uuid, Identity>>>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn insert(&self, data: NewIdentity) -> StoreResult<Identity> {
        let mut identities = self.identities.write().await;

        let email = data.email.to_lowercase();
        let username = data.username.to_lowercase();
        for existing in identities.values() {
            if existing.email.to_lowercase() == email {
                return Err(StoreError::Conflict("email".to_string()));
            }
            if existing.username.to_lowercase() == username {
                return Err(StoreError::Conflict("username".to_string()));
            }
            if data.external_subject.is_some() && existing.external_subject == data.external_subject {
                return Err(StoreError::Conflict("external subject".to_string()));
            }
        }

        let now = Utc::now();
        let identity = Identity {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            username: data.username,
            password_hash: data.password_hash,
            external_subject: data.external_subject,
            created_at: now,
            updated_at: now,
        };
        identities.insert(identity.id, identity.clone());

        Ok(identity)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Identity>> {
        Ok(self.identities.read().await.get(&id).cloned())
    }

    async fn find_by_external_subject(&self, subject: &str) -> StoreResult<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities
            .values()
            .find(|i| i.external_subject.as_deref() == Some(subject))
            .cloned())
    }

    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Identity>> {
        let identities = self.identities.read().await;
        let by_email = identities.values().find(|i| i.email.to_lowercase() == login);
        let found = by_email.or_else(|| {
            identities
                .values()
                .find(|i| i.username.to_lowercase() == login)
        });
        Ok(found.cloned())
    }

    async fn exists(
        &self,
        email: &str,
        username: &str,
        external_subject: Option<&str>,
    ) -> StoreResult<bool> {
        let identities = self.identities.read().await;
        Ok(identities.values().any(|i| {
            i.email.to_lowercase() == email
                || i.username.to_lowercase() == username
                || (external_subject.is_some() && i.external_subject.as_deref() == external_subject)
        }))
    }
}

/// In-memory task store
#[derive(Debug, Clone, Default)]
pub struct MemoryTaskStore {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, data: NewTask) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).filter(|t| t.owner_id == owner_id).cloned())
    }

    async fn list_owned(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
        let tasks = self.tasks.read().await;
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        Ok(owned)
    }

    async fn update_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &TaskPatch,
    ) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let Some(stored) = tasks.get_mut(&id).filter(|t| t.owner_id == owner_id) else {
            return Ok(None);
        };

        patch.apply_to(stored);
        stored.updated_at = Utc::now();

        Ok(Some(stored.clone()))
    }

    async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(&id) {
            Some(task) if task.owner_id == owner_id => {
                tasks.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
