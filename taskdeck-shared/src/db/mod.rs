/// Database layer
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// The Postgres store adapters live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
