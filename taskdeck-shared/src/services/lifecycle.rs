/// Task status transitions
///
/// Any of the four labels may be set from any state. Clients conventionally
/// step through `PENDING → IN_PROGRESS → DONE → ARCHIVED → PENDING` (see
/// [`TaskStatus::next`](crate::models::task::TaskStatus::next)), but the
/// engine does not enforce adjacency. Setting the current status again is
/// accepted and still refreshes `updated_at`.
use tracing::info;
use uuid::Uuid;

use super::repository::TaskRepository;
use crate::error::ServiceResult;
use crate::models::task::{Task, TaskChanges, TaskStatus};

#[derive(Clone)]
pub struct TaskLifecycle {
    repository: TaskRepository,
}

impl TaskLifecycle {
    pub fn new(repository: TaskRepository) -> Self {
        Self { repository }
    }

    /// Sets the status of an owned task
    ///
    /// # Errors
    ///
    /// - `Validation` for an unknown label; nothing is read or written
    /// - `NotFound` when the task is missing or not owned
    pub async fn change_status(&self, owner_id: Uuid, id: Uuid, status: &str) -> ServiceResult<Task> {
        let status = TaskStatus::parse(status)?;

        let task = self
            .repository
            .update(owner_id, id, TaskChanges::status(status.as_str()))
            .await?;

        info!(task_id = %id, status = %status, "Task status changed");
        Ok(task)
    }
}
