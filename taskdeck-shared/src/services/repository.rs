/// Owner-scoped task repository
///
/// Every operation takes the owner id explicitly. A task owned by someone
/// else behaves exactly like a missing one (`NotFound`), so ids of other
/// identities' tasks cannot be probed.
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{NewTask, Task, TaskChanges, TaskPatch};
use crate::store::TaskStore;

/// CRUD over tasks for a single owner at a time
#[derive(Clone)]
pub struct TaskRepository {
    tasks: Arc<dyn TaskStore>,
}

impl TaskRepository {
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Creates a `PENDING` task owned by `owner_id`
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: Option<&str>,
    ) -> ServiceResult<Task> {
        let draft = NewTask::new(owner_id, title, description)?;
        let task = self.tasks.insert(draft).await?;

        info!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    pub async fn find_by_id(&self, owner_id: Uuid, id: Uuid) -> ServiceResult<Task> {
        self.tasks
            .find_owned(owner_id, id)
            .await?
            .ok_or_else(ServiceError::task_not_found)
    }

    /// Snapshot of the owner's tasks, most recently updated first
    pub async fn list_by_owner(&self, owner_id: Uuid) -> ServiceResult<Vec<Task>> {
        let tasks = self.tasks.list_owned(owner_id).await?;
        debug!(owner_id = %owner_id, count = tasks.len(), "Listed tasks");
        Ok(tasks)
    }

    /// Applies the provided fields and refreshes `updated_at`
    ///
    /// All input is validated before storage is touched; a rejected edit
    /// leaves the task unchanged. Only the provided fields are written, so
    /// a concurrent edit of another field survives. An edit with no fields
    /// still refreshes `updated_at`.
    pub async fn update(&self, owner_id: Uuid, id: Uuid, changes: TaskChanges) -> ServiceResult<Task> {
        if changes.is_empty() {
            debug!(task_id = %id, "Empty edit, refreshing updated_at only");
        }
        let patch = TaskPatch::try_from(changes)?;

        let updated = self
            .tasks
            .update_owned(owner_id, id, &patch)
            .await?
            .ok_or_else(ServiceError::task_not_found)?;

        info!(task_id = %id, status = %updated.status, "Task updated");
        Ok(updated)
    }

    /// Hard-deletes a task
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> ServiceResult<()> {
        if !self.tasks.delete_owned(owner_id, id).await? {
            return Err(ServiceError::task_not_found());
        }

        info!(task_id = %id, owner_id = %owner_id, "Task deleted");
        Ok(())
    }

    /// Checks the backing store
    pub async fn ping(&self) -> ServiceResult<()> {
        Ok(self.tasks.ping().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::TaskStatus;
    use crate::store::memory::MemoryTaskStore;
    use crate::store::StoreResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn repository() -> TaskRepository {
        TaskRepository::new(Arc::new(MemoryTaskStore::new()))
    }

    #[tokio::test]
    async fn test_update_validates_before_touching_storage() {
        let repo = repository();
        let owner = Uuid::new_v4();

        // Invalid input is reported even for a task that does not exist
        let changes = TaskChanges {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        let err = repo.update(owner, Uuid::new_v4(), changes).await.unwrap_err();
        assert_eq!(err, ServiceError::invalid("title", "Title cannot be empty"));
    }

    #[tokio::test]
    async fn test_update_collects_every_field_error() {
        let repo = repository();
        let owner = Uuid::new_v4();
        let task = repo.create(owner, "Keep", None).await.unwrap();

        let changes = TaskChanges {
            title: Some(String::new()),
            description: Some(Some("d".repeat(1001))),
            status: Some("FINISHED".to_string()),
        };
        match repo.update(owner, task.id, changes).await.unwrap_err() {
            ServiceError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, vec!["title", "description", "status"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let unchanged = repo.find_by_id(owner, task.id).await.unwrap();
        assert_eq!(unchanged, task);
    }

    #[tokio::test]
    async fn test_delete_missing_task() {
        let repo = repository();
        let err = repo.delete(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err, ServiceError::task_not_found());
    }

    /// Lands a concurrent `DONE` status change just before the first
    /// read or write of an edit reaches the inner store
    struct ConcurrentStatusChange {
        inner: MemoryTaskStore,
        fired: AtomicBool,
    }

    impl ConcurrentStatusChange {
        async fn interleave(&self, owner_id: Uuid, id: Uuid) {
            if !self.fired.swap(true, Ordering::SeqCst) {
                let done = TaskPatch {
                    status: Some(TaskStatus::Done),
                    ..Default::default()
                };
                self.inner.update_owned(owner_id, id, &done).await.unwrap();
            }
        }
    }

    #[async_trait]
    impl TaskStore for ConcurrentStatusChange {
        async fn insert(&self, task: NewTask) -> StoreResult<Task> {
            self.inner.insert(task).await
        }

        async fn find_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
            self.interleave(owner_id, id).await;
            self.inner.find_owned(owner_id, id).await
        }

        async fn list_owned(&self, owner_id: Uuid) -> StoreResult<Vec<Task>> {
            self.inner.list_owned(owner_id).await
        }

        async fn update_owned(
            &self,
            owner_id: Uuid,
            id: Uuid,
            patch: &TaskPatch,
        ) -> StoreResult<Option<Task>> {
            self.interleave(owner_id, id).await;
            self.inner.update_owned(owner_id, id, patch).await
        }

        async fn delete_owned(&self, owner_id: Uuid, id: Uuid) -> StoreResult<bool> {
            self.inner.delete_owned(owner_id, id).await
        }

        async fn ping(&self) -> StoreResult<()> {
            self.inner.ping().await
        }
    }

    #[tokio::test]
    async fn test_title_edit_keeps_concurrent_status_change() {
        let store = Arc::new(ConcurrentStatusChange {
            inner: MemoryTaskStore::new(),
            fired: AtomicBool::new(true),
        });
        let repo = TaskRepository::new(store.clone());
        let owner = Uuid::new_v4();
        let task = repo.create(owner, "Draft", Some("notes")).await.unwrap();
        store.fired.store(false, Ordering::SeqCst);

        let changes = TaskChanges {
            title: Some("Final".to_string()),
            ..Default::default()
        };
        let updated = repo.update(owner, task.id, changes).await.unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.description.as_deref(), Some("notes"));

        let stored = repo.find_by_id(owner, task.id).await.unwrap();
        assert_eq!(stored.status, TaskStatus::Done);
    }
}
