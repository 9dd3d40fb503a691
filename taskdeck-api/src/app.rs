/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck_api::{app::AppState, config::Config};
/// use taskdeck_shared::store::memory::{MemoryIdentityStore, MemoryTaskStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(
///     Arc::new(MemoryIdentityStore::new()),
///     Arc::new(MemoryTaskStore::new()),
///     config,
/// );
/// let app = taskdeck_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{
    config::Config,
    graphql::{self, TaskdeckSchema},
    middleware::security::SecurityHeadersLayer,
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskdeck_shared::{
    auth::middleware::{auth_context_middleware, AuthSettings},
    services::{CredentialService, TaskService},
    store::{IdentityStore, TaskStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every field is reference counted, so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub credentials: CredentialService,

    /// Task operations scoped to the caller
    pub tasks: TaskService,

    /// GraphQL schema sharing the same services
    pub schema: TaskdeckSchema,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires services over the given stores
    pub fn new(
        identities: Arc<dyn IdentityStore>,
        tasks: Arc<dyn TaskStore>,
        config: Config,
    ) -> Self {
        let credentials = CredentialService::new(
            identities.clone(),
            &config.jwt.secret,
            Duration::days(config.jwt.ttl_days),
        );
        let tasks = TaskService::new(identities, tasks);
        let schema = graphql::build_schema(credentials.clone(), tasks.clone());

        Self {
            credentials,
            tasks,
            schema,
            config: Arc::new(config),
        }
    }

    fn auth_settings(&self) -> Arc<AuthSettings> {
        Arc::new(AuthSettings::new(
            self.config.jwt.secret.clone(),
            self.config.auth_subject_header.clone(),
        ))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                   # Health check (public)
/// ├── /graphql                  # GET: GraphiQL, POST: queries
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── GET  /me
///     └── /tasks/
///         ├── GET    /          # List own tasks
///         ├── POST   /          # Create
///         ├── GET    /:id
///         ├── PATCH  /:id
///         ├── DELETE /:id
///         └── PATCH  /:id/status
/// ```
///
/// # Middleware Stack
///
/// Applied in order (innermost first):
/// 1. Auth context resolution (never rejects; handlers decide)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/me", get(routes::auth::me));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/status", patch(routes::tasks::change_status));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        .nest("/v1", v1_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.auth_settings(),
            auth_context_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
