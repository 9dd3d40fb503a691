/// GraphQL surface
///
/// One schema served at `POST /graphql`, with GraphiQL on `GET /graphql`.
/// The request's [`AuthContext`] (resolved by the shared auth middleware)
/// is attached to every execution as context data.
///
/// - `errors`: service error to GraphQL error conversion
/// - `resolvers`: query and mutation roots
/// - `types`: output object types
pub mod errors;
pub mod resolvers;
pub mod types;

use async_graphql::{http::GraphiQLSource, EmptySubscription, Schema};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use taskdeck_shared::auth::middleware::AuthContext;
use taskdeck_shared::services::{CredentialService, TaskService};

use crate::{app::AppState, error::ApiResult};
use resolvers::{MutationRoot, QueryRoot};

pub type TaskdeckSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// GraphiQL loads its assets from unpkg
const GRAPHIQL_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-inline' https://unpkg.com; \
     style-src 'self' 'unsafe-inline' https://unpkg.com; \
     img-src 'self' data:; connect-src 'self'";

pub fn build_schema(credentials: CredentialService, tasks: TaskService) -> TaskdeckSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(credentials)
        .data(tasks)
        .finish()
}

/// Executes one GraphQL request
///
/// Resolver errors come back inside the GraphQL response with status 200;
/// only a body that is not a GraphQL request at all yields a 400.
pub async fn graphql_handler(
    State(state): State<AppState>,
    auth: AuthContext,
    request: Result<Json<async_graphql::Request>, JsonRejection>,
) -> ApiResult<Json<async_graphql::Response>> {
    let Json(request) = request?;
    let response = state.schema.execute(request.data(auth)).await;
    Ok(Json(response))
}

pub async fn graphiql() -> impl IntoResponse {
    (
        [(header::CONTENT_SECURITY_POLICY, GRAPHIQL_CONTENT_SECURITY_POLICY)],
        Html(GraphiQLSource::build().endpoint("/graphql").finish()),
    )
}
