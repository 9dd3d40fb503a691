/// Task model and field validation
///
/// A task is a unit of work owned by exactly one identity. The owner is set
/// at creation and never written again; listing is a lookup by `owner_id`,
/// there is no back-reference on the identity.
///
/// # Status
///
/// ```text
/// PENDING  IN_PROGRESS  DONE  ARCHIVED
/// ```
///
/// The status is a set of labels, not a transition graph: any label may be
/// set from any other. Clients conventionally cycle
/// `PENDING → IN_PROGRESS → DONE → ARCHIVED → PENDING` (see
/// [`TaskStatus::next`]) but the engine does not enforce it.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('PENDING', 'IN_PROGRESS', 'DONE', 'ARCHIVED');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES identities(id),
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(1000),
///     status task_status NOT NULL DEFAULT 'PENDING',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{FieldError, ServiceError};

/// Maximum title length, counted in characters after trimming
pub const TITLE_MAX_LEN: usize = 200;

/// Maximum description length, counted in characters after trimming
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Task status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Finished
    Done,

    /// Put away
    Archived,
}

impl TaskStatus {
    /// All labels, in cycle order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Archived,
    ];

    /// Converts status to its wire/storage label
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Archived => "ARCHIVED",
        }
    }

    /// Parses a status label
    ///
    /// This is the single status validator: both the dedicated status-change
    /// operation and the generic edit path go through it.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` on the `status` field for any string
    /// that is not exactly one of the four labels.
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck_shared::models::task::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::parse("DONE").unwrap(), TaskStatus::Done);
    /// assert!(TaskStatus::parse("done").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, ServiceError> {
        match value {
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            "ARCHIVED" => Ok(TaskStatus::Archived),
            _ => Err(ServiceError::invalid(
                "status",
                "Valid status is required (PENDING, IN_PROGRESS, DONE, ARCHIVED)",
            )),
        }
    }

    /// Next label in the client-side cycle
    ///
    /// Informational only; `change_status` accepts any label.
    pub fn next(&self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Archived,
            TaskStatus::Archived => TaskStatus::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::parse(s)
    }
}

/// Task snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Identity that owns this task (immutable)
    pub owner_id: Uuid,

    /// Trimmed title, never empty
    pub title: String,

    /// Trimmed description, `None` when absent or blank
    pub description: Option<String>,

    /// Current status label
    pub status: TaskStatus,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last mutated
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

impl NewTask {
    /// Trims and validates creation input
    ///
    /// # Errors
    ///
    /// `ServiceError::Validation` when the trimmed title is empty or either
    /// field exceeds its length limit. All field errors are reported together.
    pub fn new(owner_id: Uuid, title: &str, description: Option<&str>) -> Result<Self, ServiceError> {
        let mut errors = Vec::new();

        let title = match validate_title(title, "Title is required") {
            Ok(title) => title,
            Err(e) => {
                errors.push(e);
                String::new()
            }
        };

        let description = match validate_description(description) {
            Ok(description) => description,
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        Ok(Self {
            owner_id,
            title,
            description,
        })
    }
}

/// Requested edits to a task
///
/// Only `Some` fields are applied. `description: Some(None)` clears the
/// description, as does `Some(Some("   "))`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChanges {
    /// New title (trimmed, must stay non-empty)
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    ///
    /// In JSON an explicit `null` clears, an absent key leaves it unchanged.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    /// New status label, checked by [`TaskStatus::parse`]
    pub status: Option<String>,
}

impl TaskChanges {
    /// Changes that only set the status
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

/// Validated edit, ready for storage
///
/// Produced from [`TaskChanges`]; stores write only the fields that are
/// `Some`, so columns the caller did not touch are never rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,

    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,

    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// Applies the patch to an in-memory snapshot
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

impl TryFrom<TaskChanges> for TaskPatch {
    type Error = ServiceError;

    /// Trims and validates every provided field, reporting all failures
    fn try_from(changes: TaskChanges) -> Result<Self, Self::Error> {
        let mut errors: Vec<FieldError> = Vec::new();

        let title = changes
            .title
            .as_deref()
            .map(|t| validate_title(t, "Title cannot be empty"))
            .transpose()
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });

        let description = changes
            .description
            .as_ref()
            .map(|d| validate_description(d.as_deref()))
            .transpose()
            .unwrap_or_else(|e| {
                errors.push(e);
                None
            });

        let status = match changes.status.as_deref().map(TaskStatus::parse).transpose() {
            Ok(status) => status,
            Err(ServiceError::Validation(fields)) => {
                errors.extend(fields);
                None
            }
            Err(other) => return Err(other),
        };

        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        Ok(Self {
            title,
            description,
            status,
        })
    }
}

/// Parses a task id supplied by a client
///
/// A malformed id cannot name any task, so it reports `NotFound` just like
/// an id that does not exist.
pub fn parse_task_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ServiceError::task_not_found())
}

/// Maps a present JSON key (including `null`) to `Some`
///
/// Use with `#[serde(default, deserialize_with = "present")]` on an
/// `Option<Option<T>>` field.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trims a title and checks it is non-empty and within the length limit
fn validate_title(title: &str, empty_message: &str) -> Result<String, FieldError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("title", empty_message));
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(FieldError::new(
            "title",
            format!("Title cannot exceed {} characters", TITLE_MAX_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

/// Trims a description; blank input becomes `None`
fn validate_description(description: Option<&str>) -> Result<Option<String>, FieldError> {
    let Some(trimmed) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > DESCRIPTION_MAX_LEN {
        return Err(FieldError::new(
            "description",
            format!("Description cannot exceed {} characters", DESCRIPTION_MAX_LEN),
        ));
    }
    Ok(Some(trimmed.to_string()))
}
