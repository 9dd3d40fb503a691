//! # Taskdeck Shared Library
//!
//! Domain types, storage and business logic behind the Taskdeck API.
//!
//! ## Module Organization
//!
//! - `models`: identities, tasks and their input validation
//! - `auth`: password hashing, session tokens, request auth context
//! - `store`: storage ports with Postgres and in-memory adapters
//! - `db`: connection pool and migrations
//! - `services`: credentials, task repository, lifecycle, access layer
//! - `error`: the error taxonomy returned by every service operation

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Taskdeck shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
