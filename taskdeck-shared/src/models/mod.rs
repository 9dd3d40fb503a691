/// Data models for Taskdeck
///
/// This module contains the domain records and their input validation.
/// Persistence lives behind the ports in [`crate::store`].
///
/// # Models
///
/// - `identity`: registered users and registration input
/// - `task`: owned tasks, status labels and edit requests
///
/// # Example
///
/// ```
/// use taskdeck_shared::models::task::{NewTask, TaskStatus};
/// use uuid::Uuid;
///
/// let draft = NewTask::new(Uuid::new_v4(), "  Buy milk  ", None).unwrap();
/// assert_eq!(draft.title, "Buy milk");
/// assert_eq!(TaskStatus::default(), TaskStatus::Pending);
/// ```

pub mod identity;
pub mod task;
