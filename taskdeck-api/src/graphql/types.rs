/// GraphQL output types
///
/// Field names follow the GraphQL camelCase convention (`userId`,
/// `createdAt`). Timestamps are RFC 3339 strings with millisecond precision.
use async_graphql::{Enum, SimpleObject, ID};
use chrono::{DateTime, SecondsFormat, Utc};
use taskdeck_shared::models::identity::IdentityProfile;
use taskdeck_shared::models::task::Task;
use taskdeck_shared::services::AuthSession;

/// Task status as exposed over GraphQL
#[derive(Enum, Copy, Clone, Debug, PartialEq, Eq)]
#[graphql(name = "TaskStatus", remote = "taskdeck_shared::models::task::TaskStatus")]
pub enum TaskStatusValue {
    Pending,
    InProgress,
    Done,
    Archived,
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "User")]
pub struct UserObject {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub username: String,
}

impl From<IdentityProfile> for UserObject {
    fn from(profile: IdentityProfile) -> Self {
        Self {
            id: ID::from(profile.id.to_string()),
            name: profile.name,
            email: profile.email,
            username: profile.username,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserObject,
}

impl From<AuthSession> for AuthPayload {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Task")]
pub struct TaskObject {
    pub id: ID,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatusValue,
    pub user_id: ID,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskObject {
    fn from(task: Task) -> Self {
        Self {
            id: ID::from(task.id.to_string()),
            title: task.title,
            description: task.description,
            status: task.status.into(),
            user_id: ID::from(task.owner_id.to_string()),
            created_at: timestamp(task.created_at),
            updated_at: timestamp(task.updated_at),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
