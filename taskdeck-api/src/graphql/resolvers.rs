/// Query and mutation roots
///
/// Resolvers are thin: each one reads the request's [`AuthContext`] from
/// the GraphQL context, calls one service operation, and converts the
/// result. All access rules live in the services.
use async_graphql::{Context, MaybeUndefined, Object, Result, ID};
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::error::ServiceError;
use taskdeck_shared::models::task::{parse_task_id, TaskChanges, TaskStatus};
use taskdeck_shared::services::{CredentialService, RegisterInput, TaskService};

use super::errors::IntoGraphql;
use super::types::{AuthPayload, TaskObject, TaskStatusValue, UserObject};

fn auth(ctx: &Context<'_>) -> AuthContext {
    ctx.data_opt::<AuthContext>().cloned().unwrap_or_default()
}

/// Rejects unauthenticated callers ahead of id parsing
fn require_principal(auth: &AuthContext) -> Result<()> {
    match auth {
        AuthContext::Unauthenticated => Err(ServiceError::AuthenticationRequired).into_graphql(),
        AuthContext::Authenticated(_) => Ok(()),
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated user
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<UserObject>> {
        let tasks = ctx.data::<TaskService>()?;
        let identity = tasks.current_identity(&auth(ctx)).await.into_graphql()?;
        Ok(Some(identity.profile().into()))
    }

    /// The caller's tasks, most recently updated first
    async fn tasks(&self, ctx: &Context<'_>) -> Result<Vec<TaskObject>> {
        let tasks = ctx.data::<TaskService>()?;
        let list = tasks.list_tasks(&auth(ctx)).await.into_graphql()?;
        Ok(list.into_iter().map(TaskObject::from).collect())
    }

    async fn task(&self, ctx: &Context<'_>, id: ID) -> Result<Option<TaskObject>> {
        let tasks = ctx.data::<TaskService>()?;
        let auth = auth(ctx);
        require_principal(&auth)?;
        let id = parse_task_id(&id).into_graphql()?;
        let task = tasks.get_task(&auth, id).await.into_graphql()?;
        Ok(Some(task.into()))
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register_user(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        username: Option<String>,
        password: String,
    ) -> Result<AuthPayload> {
        let credentials = ctx.data::<CredentialService>()?;
        let session = credentials
            .register(RegisterInput {
                name,
                email,
                password: Some(password),
                username,
                external_subject: auth(ctx).external_subject().map(str::to_string),
            })
            .await
            .into_graphql()?;
        Ok(session.into())
    }

    async fn login_user(
        &self,
        ctx: &Context<'_>,
        email_or_username: String,
        password: String,
    ) -> Result<AuthPayload> {
        let credentials = ctx.data::<CredentialService>()?;
        let session = credentials
            .authenticate(&email_or_username, &password)
            .await
            .into_graphql()?;
        Ok(session.into())
    }

    async fn create_task(
        &self,
        ctx: &Context<'_>,
        title: String,
        description: Option<String>,
    ) -> Result<TaskObject> {
        let tasks = ctx.data::<TaskService>()?;
        let task = tasks
            .create_task(&auth(ctx), &title, description.as_deref())
            .await
            .into_graphql()?;
        Ok(task.into())
    }

    /// Omitted arguments are left unchanged; `description: null` clears it
    async fn update_task(
        &self,
        ctx: &Context<'_>,
        id: ID,
        title: Option<String>,
        description: MaybeUndefined<String>,
    ) -> Result<TaskObject> {
        let tasks = ctx.data::<TaskService>()?;
        let auth = auth(ctx);
        require_principal(&auth)?;
        let id = parse_task_id(&id).into_graphql()?;

        let description = match description {
            MaybeUndefined::Undefined => None,
            MaybeUndefined::Null => Some(None),
            MaybeUndefined::Value(value) => Some(Some(value)),
        };
        let changes = TaskChanges {
            title,
            description,
            status: None,
        };

        let task = tasks.update_task(&auth, id, changes).await.into_graphql()?;
        Ok(task.into())
    }

    async fn delete_task(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        let tasks = ctx.data::<TaskService>()?;
        let auth = auth(ctx);
        require_principal(&auth)?;
        let id = parse_task_id(&id).into_graphql()?;
        tasks.delete_task(&auth, id).await.into_graphql()?;
        Ok(true)
    }

    async fn change_task_status(
        &self,
        ctx: &Context<'_>,
        id: ID,
        status: TaskStatusValue,
    ) -> Result<TaskObject> {
        let tasks = ctx.data::<TaskService>()?;
        let auth = auth(ctx);
        require_principal(&auth)?;
        let id = parse_task_id(&id).into_graphql()?;

        let status = TaskStatus::from(status);
        let task = tasks
            .change_task_status(&auth, id, status.as_str())
            .await
            .into_graphql()?;
        Ok(task.into())
    }
}
