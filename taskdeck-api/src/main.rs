//! # Taskdeck API Server
//!
//! Serves the task API over REST (`/v1`) and GraphQL (`/graphql`).
//!
//! Data lives in PostgreSQL when `DATABASE_URL` is set (migrations run at
//! startup) and in process memory otherwise.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p taskdeck-api
//! ```

use std::sync::Arc;
use taskdeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskdeck_shared::{
    db::{migrations, pool},
    store::{
        memory::{MemoryIdentityStore, MemoryTaskStore},
        postgres::{PgIdentityStore, PgTaskStore},
        IdentityStore, TaskStore,
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskdeck_api=debug,taskdeck_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskdeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    let (identities, tasks, db): (Arc<dyn IdentityStore>, Arc<dyn TaskStore>, _) =
        match &config.database {
            Some(database) => {
                migrations::ensure_database_exists(&database.url).await?;
                let db = pool::create_pool(pool::DatabaseConfig::new(
                    database.url.clone(),
                    database.max_connections,
                ))
                .await?;
                migrations::run_migrations(&db).await?;

                (
                    Arc::new(PgIdentityStore::new(db.clone())),
                    Arc::new(PgTaskStore::new(db.clone())),
                    Some(db),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set, data will be kept in memory only");
                (
                    Arc::new(MemoryIdentityStore::new()),
                    Arc::new(MemoryTaskStore::new()),
                    None,
                )
            }
        };

    let app = build_router(AppState::new(identities, tasks, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        pool::close_pool(db).await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
