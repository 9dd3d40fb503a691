/// Task endpoints
///
/// Every handler acts on behalf of the authenticated caller and only ever
/// sees that caller's tasks. A task owned by someone else, an unknown id and
/// a malformed id all answer `404 Task not found`.
///
/// # Endpoints
///
/// - `GET /v1/tasks` - List own tasks, most recently updated first
/// - `POST /v1/tasks` - Create a task
/// - `GET /v1/tasks/:id` - Fetch one task
/// - `PATCH /v1/tasks/:id` - Edit title and/or description
/// - `DELETE /v1/tasks/:id` - Delete a task
/// - `PATCH /v1/tasks/:id/status` - Set the status label
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::{
    auth::middleware::AuthContext,
    error::ServiceError,
    models::task::{parse_task_id, present, Task, TaskChanges, TaskStatus},
};
use uuid::Uuid;

/// Task as returned over REST
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub user_id: Uuid,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            status: task.status,
            user_id: task.owner_id,
            created_at: timestamp(task.created_at),
            updated_at: timestamp(task.updated_at),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Create task request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Missing reads as empty, which fails validation with a field error
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
}

/// Edit request
///
/// Status is not editable here; it changes through `/status` only.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,

    /// Absent leaves the description alone, `null` clears it
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(req: UpdateTaskRequest) -> Self {
        TaskChanges {
            title: req.title,
            description: req.description,
            status: None,
        }
    }
}

/// Status change request
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Delete confirmation
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

/// Checks the caller before the path id, so an anonymous request with a
/// malformed id still answers 401
fn task_id(auth: &AuthContext, raw: &str) -> Result<Uuid, ServiceError> {
    if auth.principal().is_none() {
        return Err(ServiceError::AuthenticationRequired);
    }
    parse_task_id(raw)
}

pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let tasks = state.tasks.list_tasks(&auth).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Create a task
///
/// # Errors
///
/// - `401 Unauthorized`: No authenticated caller
/// - `422 Unprocessable Entity`: Blank or oversized title, oversized description
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    body: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(req) = body?;

    let task = state
        .tasks
        .create_task(&auth, &req.title, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(task.into())))
}

pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = task_id(&auth, &id)?;
    let task = state.tasks.get_task(&auth, id).await?;
    Ok(Json(task.into()))
}

/// Edit a task
///
/// Absent keys are left unchanged; `"description": null` clears the
/// description. An empty body still refreshes `updatedAt`. A `status` key
/// is rejected with 400.
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = task_id(&auth, &id)?;
    let Json(req) = body?;

    let task = state.tasks.update_task(&auth, id, req.into()).await?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = task_id(&auth, &id)?;
    state.tasks.delete_task(&auth, id).await?;

    Ok(Json(DeleteResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Set the status label
///
/// Any of `PENDING`, `IN_PROGRESS`, `DONE`, `ARCHIVED` is accepted from any
/// current status. Anything else is a 422 and leaves the task untouched.
pub async fn change_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<String>,
    body: Result<Json<ChangeStatusRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let id = task_id(&auth, &id)?;
    let Json(req) = body?;

    let task = state
        .tasks
        .change_task_status(&auth, id, &req.status)
        .await?;
    Ok(Json(task.into()))
}
