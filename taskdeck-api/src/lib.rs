//! # Taskdeck API Server Library
//!
//! HTTP surfaces over the task services in `taskdeck-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `graphql`: GraphQL schema, resolvers and handler
//! - `middleware`: Security headers
//! - `routes`: REST route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod graphql;
pub mod middleware;
pub mod routes;
